//! Global hotkeys and the raw keyboard feed.
//!
//! `RegisterHotKey` binds a hotkey to the calling thread's message
//! queue, and a `WH_KEYBOARD_LL` hook only runs while its thread pumps
//! messages. Both therefore live on one dedicated thread. The engine
//! talks to it through [`Win32Hotkeys`], which forwards requests over a
//! channel and wakes the pump with a posted message.

use std::cell::RefCell;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, HOT_KEY_MODIFIERS, RegisterHotKey, UnregisterHotKey, VK_CONTROL,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, KBDLLHOOKSTRUCT, MSG, PM_NOREMOVE,
    PeekMessageW, PostThreadMessageW, SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx,
    WH_KEYBOARD_LL, WM_APP, WM_HOTKEY, WM_KEYDOWN, WM_QUIT, WM_SYSKEYDOWN, WM_USER,
};
use winshift_core::hotkey::{HotkeyAction, KeyCombo};
use winshift_core::platform::{HotkeyCallback, HotkeyRegistrar, RawKeySource};
use winshift_core::{Error, Result};

use crate::keys;

/// Posted to the hotkey thread when a request is queued.
const WM_REQUEST: u32 = WM_APP + 1;

/// How long a caller waits for the hotkey thread to answer.
const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

// Thread-local sender for the keyboard hook callback.
thread_local! {
    static RAW_KEY_SENDER: RefCell<Option<Sender<u8>>> = const { RefCell::new(None) };
}

enum Request {
    Register {
        id: i32,
        modifiers: u32,
        vk: u32,
        callback: HotkeyCallback,
        reply: Sender<std::result::Result<(), String>>,
    },
    Unregister {
        id: i32,
        reply: Sender<std::result::Result<(), String>>,
    },
    Ping {
        reply: Sender<()>,
    },
}

/// Hotkey registrar backed by the dedicated hotkey thread.
///
/// Dropping it stops the thread, which releases any hotkey still
/// registered and removes the keyboard hook.
pub struct Win32Hotkeys {
    thread_id: u32,
    requests: Sender<Request>,
    handle: Option<JoinHandle<()>>,
}

/// Raw key-down events captured by the keyboard hook.
pub struct Win32RawKeys {
    keys: Receiver<u8>,
}

/// Starts the hotkey thread.
///
/// A keyboard hook that cannot be installed is not fatal: the raw key
/// source reports itself disconnected and recovery stays off.
pub fn start() -> Result<(Win32Hotkeys, Win32RawKeys)> {
    let (request_tx, request_rx) = mpsc::channel::<Request>();
    let (key_tx, key_rx) = mpsc::channel::<u8>();
    let (ready_tx, ready_rx) = mpsc::channel::<u32>();

    let handle = thread::Builder::new()
        .name("winshift-hotkeys".into())
        .spawn(move || run(request_rx, key_tx, ready_tx))
        .map_err(|e| Error::os("spawn hotkey thread", e))?;

    let thread_id = ready_rx
        .recv_timeout(REPLY_TIMEOUT)
        .map_err(|_| Error::Disconnected("hotkey thread"))?;

    Ok((
        Win32Hotkeys {
            thread_id,
            requests: request_tx,
            handle: Some(handle),
        },
        Win32RawKeys { keys: key_rx },
    ))
}

fn run(requests: Receiver<Request>, key_tx: Sender<u8>, ready_tx: Sender<u32>) {
    // SAFETY: Forces creation of this thread's message queue so posted
    // requests are not lost before the pump starts.
    let thread_id = unsafe {
        let mut msg = MSG::default();
        let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
        GetCurrentThreadId()
    };

    // SAFETY: WH_KEYBOARD_LL hooks run on this thread while it pumps.
    let hook = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_proc), None, 0) } {
        Ok(hook) => {
            RAW_KEY_SENDER.with(|cell| *cell.borrow_mut() = Some(key_tx));
            Some(hook)
        }
        Err(e) => {
            winshift_core::log_warn!(
                "Keyboard hook unavailable, recovery disabled: {}",
                e.message()
            );
            drop(key_tx);
            None
        }
    };

    let _ = ready_tx.send(thread_id);

    let mut registered: Vec<(i32, HotkeyCallback)> = Vec::new();
    let mut msg = MSG::default();

    while unsafe { GetMessageW(&mut msg, None, 0, 0).as_bool() } {
        match msg.message {
            WM_HOTKEY => dispatch(&registered, msg.wParam.0 as i32),
            WM_REQUEST => serve(&requests, &mut registered),
            _ => unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            },
        }
    }

    for (id, _) in registered.drain(..) {
        // SAFETY: Releases a registration made on this thread.
        unsafe {
            let _ = UnregisterHotKey(None, id);
        }
    }
    if let Some(hook) = hook {
        // SAFETY: The hook was installed on this thread.
        unsafe {
            let _ = UnhookWindowsHookEx(hook);
        }
    }
    RAW_KEY_SENDER.with(|cell| cell.borrow_mut().take());
}

/// Answers every queued request.
fn serve(requests: &Receiver<Request>, registered: &mut Vec<(i32, HotkeyCallback)>) {
    loop {
        let request = match requests.try_recv() {
            Ok(request) => request,
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => return,
        };

        match request {
            Request::Register {
                id,
                modifiers,
                vk,
                callback,
                reply,
            } => {
                // SAFETY: Binds the hotkey to this thread's message queue.
                let result = unsafe { RegisterHotKey(None, id, HOT_KEY_MODIFIERS(modifiers), vk) }
                    .map_err(|e| e.message());
                if result.is_ok() {
                    registered.retain(|(existing, _)| *existing != id);
                    registered.push((id, callback));
                }
                let _ = reply.send(result);
            }
            Request::Unregister { id, reply } => {
                registered.retain(|(existing, _)| *existing != id);
                // SAFETY: Releases a registration made on this thread.
                let result = unsafe { UnregisterHotKey(None, id) }.map_err(|e| e.message());
                let _ = reply.send(result);
            }
            Request::Ping { reply } => {
                let _ = reply.send(());
            }
        }
    }
}

/// Runs the callback for a `WM_HOTKEY` on a worker thread.
///
/// A pass sleeps between windows, and the pump must keep servicing the
/// keyboard hook meanwhile or Windows silently removes it.
fn dispatch(registered: &[(i32, HotkeyCallback)], id: i32) {
    let Some((_, callback)) = registered.iter().find(|(existing, _)| *existing == id) else {
        return;
    };

    let callback = HotkeyCallback::clone(callback);
    if let Err(e) = thread::Builder::new()
        .name("winshift-hotkey-action".into())
        .spawn(move || callback())
    {
        winshift_core::log_error!("Failed to run hotkey action: {e}");
    }
}

unsafe extern "system" fn keyboard_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let message = wparam.0 as u32;
    if code >= 0 && (message == WM_KEYDOWN || message == WM_SYSKEYDOWN) {
        // SAFETY: For WH_KEYBOARD_LL, lparam points to a KBDLLHOOKSTRUCT.
        let info = unsafe { &*(lparam.0 as *const KBDLLHOOKSTRUCT) };
        RAW_KEY_SENDER.with(|cell| {
            if let Some(sender) = cell.borrow().as_ref() {
                let _ = sender.send(info.vkCode as u8);
            }
        });
    }
    unsafe { CallNextHookEx(None, code, wparam, lparam) }
}

impl Win32Hotkeys {
    fn send(&self, request: Request) -> Result<()> {
        self.requests
            .send(request)
            .map_err(|_| Error::Disconnected("hotkey thread"))?;

        // SAFETY: Wakes the pump; the request is already queued.
        unsafe { PostThreadMessageW(self.thread_id, WM_REQUEST, WPARAM(0), LPARAM(0)) }
            .map_err(|e| Error::os("PostThreadMessageW", e.message()))
    }

    fn call(
        &self,
        make: impl FnOnce(Sender<std::result::Result<(), String>>) -> Request,
    ) -> Result<std::result::Result<(), String>> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(make(reply_tx))?;
        reply_rx
            .recv_timeout(REPLY_TIMEOUT)
            .map_err(|_| Error::Disconnected("hotkey thread"))
    }
}

/// Hotkey IDs are the action's position plus one; 0 is reserved.
fn hotkey_id(action: HotkeyAction) -> i32 {
    action.index() as i32 + 1
}

impl HotkeyRegistrar for Win32Hotkeys {
    fn register(
        &mut self,
        action: HotkeyAction,
        combo: &KeyCombo,
        callback: HotkeyCallback,
    ) -> Result<()> {
        let (modifiers, vk) = keys::resolve(combo)?;
        let id = hotkey_id(action);

        winshift_core::log_debug!("Registering {action} hotkey {combo} (vk=0x{vk:02X})");
        self.call(|reply| Request::Register {
            id,
            modifiers,
            vk,
            callback,
            reply,
        })?
        .map_err(|message| Error::Registration { action, message })
    }

    fn unregister(&mut self, action: HotkeyAction) -> Result<()> {
        let id = hotkey_id(action);
        self.call(|reply| Request::Unregister { id, reply })?
            .map_err(|message| Error::os("UnregisterHotKey", message))
    }

    fn validate(&self, combo: &KeyCombo) -> Result<()> {
        keys::resolve(combo).map(|_| ())
    }

    /// Pings the hotkey thread, then reads the Ctrl key state.
    ///
    /// The key state query touches the input subsystem without
    /// changing any registration.
    fn probe(&mut self) -> Result<()> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(Request::Ping { reply: reply_tx })?;
        reply_rx
            .recv_timeout(REPLY_TIMEOUT)
            .map_err(|_| Error::Disconnected("hotkey thread"))?;

        // SAFETY: Read-only key state query.
        let state = unsafe { GetAsyncKeyState(i32::from(VK_CONTROL.0)) };
        let ctrl_down = (state as u16 & 0x8000) != 0;
        winshift_core::log_debug!("Hotkey thread alive, ctrl pressed = {ctrl_down}");
        Ok(())
    }
}

impl Drop for Win32Hotkeys {
    fn drop(&mut self) {
        // SAFETY: Ends the pump; the thread cleans up after itself.
        unsafe {
            let _ = PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl RawKeySource for Win32RawKeys {
    fn poll_raw_key(&mut self) -> Result<Option<u8>> {
        match self.keys.try_recv() {
            Ok(key) => Ok(Some(key)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Error::Disconnected("keyboard hook")),
        }
    }
}
