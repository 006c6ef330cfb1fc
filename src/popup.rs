use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use foldermenu_core::lister::FsLister;
use foldermenu_core::menu::{Entry, MenuTree, NodeId};
use foldermenu_core::session::{Action, CloseReason, MenuEvent, Session, SHOW_DELAY};
use windows::core::{w, PCWSTR, PWSTR};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::VK_ESCAPE;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::icon::{MenuBitmap, ShellIcons};
use crate::launcher::ShellLauncher;
use crate::notify::MessageBoxNotifier;
use crate::wide::wide;

pub type MenuSession = Session<FsLister, ShellIcons, ShellLauncher, MessageBoxNotifier>;

const SHOW_TIMER_ID: usize = 1;
const EXIT_TIMER_ID: usize = 2;
const EMPTY_LABEL: &str = "(Empty)";

/// Owns the root popup menu. Destroying it also destroys every submenu.
struct OwnedMenu(HMENU);

impl OwnedMenu {
    fn create() -> Option<Self> {
        unsafe { CreatePopupMenu() }.ok().map(Self)
    }
}

impl Drop for OwnedMenu {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyMenu(self.0);
        }
    }
}

// Field order matters: the menus go before the session that owns their bitmaps.
struct PopupState {
    root: OwnedMenu,
    submenus: HashMap<isize, NodeId>,
    session: MenuSession,
}

thread_local! {
    static POPUP: RefCell<Option<PopupState>> = const { RefCell::new(None) };
    static CLICKED_FOLDER: Cell<Option<u32>> = const { Cell::new(None) };
    static LAST_KEY_ESCAPE: Cell<bool> = const { Cell::new(false) };
    static FOCUS_LOST: Cell<bool> = const { Cell::new(false) };
}

/// Shows the popup at the cursor and pumps messages until the session ends.
pub fn run(session: MenuSession) -> bool {
    let Some(hwnd) = create_owner_window() else {
        log::error!("Failed to create the popup owner window");
        return false;
    };
    let Some(root) = OwnedMenu::create() else {
        log::error!("Failed to create the popup menu");
        unsafe {
            let _ = DestroyWindow(hwnd);
        }
        return false;
    };

    let mut state = PopupState {
        root,
        submenus: HashMap::new(),
        session,
    };
    render(
        state.session.tree(),
        &mut state.submenus,
        state.root.0,
        None,
    );
    POPUP.with(|p| *p.borrow_mut() = Some(state));

    unsafe {
        SetTimer(Some(hwnd), SHOW_TIMER_ID, SHOW_DELAY.as_millis() as u32, None);

        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    POPUP.with(|p| p.borrow_mut().take());
    true
}

fn create_owner_window() -> Option<HWND> {
    unsafe {
        let instance = GetModuleHandleW(None).ok()?;
        let class_name = w!("FolderMenuOwnerWindow");

        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(wnd_proc),
            hInstance: instance.into(),
            lpszClassName: class_name,
            ..Default::default()
        };
        RegisterClassExW(&wc);

        // Never shown; it only owns the popup and receives its notifications.
        CreateWindowExW(
            WS_EX_TOOLWINDOW,
            class_name,
            w!("FolderMenu"),
            WS_POPUP,
            0,
            0,
            0,
            0,
            None,
            None,
            Some(instance.into()),
            None,
        )
        .ok()
    }
}

unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_TIMER if wparam.0 == SHOW_TIMER_ID => {
            let _ = KillTimer(Some(hwnd), SHOW_TIMER_ID);
            show_popup(hwnd);
            LRESULT(0)
        }
        WM_TIMER if wparam.0 == EXIT_TIMER_ID => {
            let _ = KillTimer(Some(hwnd), EXIT_TIMER_ID);
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }
        WM_INITMENUPOPUP => {
            on_init_menu_popup(HMENU(wparam.0 as *mut _));
            LRESULT(0)
        }
        WM_ACTIVATEAPP => {
            if wparam.0 == 0 {
                FOCUS_LOST.set(true);
            }
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }
        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

fn show_popup(hwnd: HWND) {
    let Some(menu) = POPUP.with(|p| p.borrow().as_ref().map(|s| s.root.0)) else {
        unsafe {
            let _ = DestroyWindow(hwnd);
        }
        return;
    };

    let command = unsafe {
        let hook = MenuFilterHook::install();
        if hook.is_none() {
            log::warn!("Menu filter hook unavailable; folders open only as submenus");
        }

        // The owner must be foreground or the menu will not close on an outside click.
        let _ = SetForegroundWindow(hwnd);
        let mut pt = POINT::default();
        let _ = GetCursorPos(&mut pt);

        let command = TrackPopupMenuEx(
            menu,
            (TPM_LEFTALIGN | TPM_TOPALIGN | TPM_RIGHTBUTTON | TPM_RETURNCMD).0,
            pt.x,
            pt.y,
            hwnd,
            None,
        );
        drop(hook);
        let _ = PostMessageW(Some(hwnd), WM_NULL, WPARAM(0), LPARAM(0));
        command.0 as u32
    };

    // Taken out of the thread-local so a message box can pump messages freely.
    let Some(mut state) = POPUP.with(|p| p.borrow_mut().take()) else {
        unsafe {
            let _ = DestroyWindow(hwnd);
        }
        return;
    };

    let selected = match command {
        0 => CLICKED_FOLDER.take(),
        id => Some(id),
    };
    let event = match selected.and_then(|cmd| node_for_command(state.session.tree(), cmd)) {
        Some(id) => MenuEvent::Select(id),
        None => MenuEvent::Dismissed(close_reason()),
    };
    let action = state.session.handle(event);
    POPUP.with(|p| *p.borrow_mut() = Some(state));

    match action {
        Action::ExitAfter(delay) => unsafe {
            SetTimer(Some(hwnd), EXIT_TIMER_ID, delay.as_millis() as u32, None);
        },
        Action::ExitNow | Action::Continue | Action::Refresh(_) => unsafe {
            let _ = DestroyWindow(hwnd);
        },
    }
}

fn close_reason() -> CloseReason {
    if LAST_KEY_ESCAPE.get() {
        CloseReason::Escape
    } else if FOCUS_LOST.get() {
        CloseReason::FocusLost
    } else {
        CloseReason::Cancelled
    }
}

fn on_init_menu_popup(menu: HMENU) {
    POPUP.with(|p| {
        let Ok(mut guard) = p.try_borrow_mut() else {
            return;
        };
        let Some(state) = guard.as_mut() else {
            return;
        };
        let Some(&id) = state.submenus.get(&(menu.0 as isize)) else {
            return;
        };

        if let Action::Refresh(id) = state.session.handle(MenuEvent::Expand(id)) {
            clear(menu);
            render(state.session.tree(), &mut state.submenus, menu, Some(id));
        }
    });
}

// Command id 0 means "no selection", so node indices are shifted by one.
fn command_id(id: NodeId) -> u32 {
    id.index() as u32 + 1
}

fn node_for_command<I>(tree: &MenuTree<I>, command: u32) -> Option<NodeId> {
    let index = (command as usize).checked_sub(1)?;
    tree.node_id(index)
}

fn render(
    tree: &MenuTree<MenuBitmap>,
    submenus: &mut HashMap<isize, NodeId>,
    menu: HMENU,
    parent: Option<NodeId>,
) {
    let entries = tree.entries(parent);
    if entries.is_empty() {
        append_inert(menu, EMPTY_LABEL);
        return;
    }

    for entry in entries {
        match entry {
            Entry::Inert(label) => append_inert(menu, label),
            Entry::Node(id) => {
                let Some(node) = tree.node(id) else {
                    continue;
                };
                let submenu = if node.is_folder() {
                    let Ok(submenu) = (unsafe { CreatePopupMenu() }) else {
                        continue;
                    };
                    submenus.insert(submenu.0 as isize, id);
                    render(tree, submenus, submenu, Some(id));
                    Some(submenu)
                } else {
                    None
                };
                append_node(menu, command_id(id), node.name(), submenu, node.icon());
            }
        }
    }
}

fn append_node(
    menu: HMENU,
    command: u32,
    name: &str,
    submenu: Option<HMENU>,
    icon: Option<&MenuBitmap>,
) {
    let mut text = wide(escape_mnemonics(name));
    let mut info = MENUITEMINFOW {
        cbSize: std::mem::size_of::<MENUITEMINFOW>() as u32,
        fMask: MIIM_ID | MIIM_STRING,
        wID: command,
        dwTypeData: PWSTR(text.as_mut_ptr()),
        ..Default::default()
    };
    if let Some(submenu) = submenu {
        info.fMask |= MIIM_SUBMENU;
        info.hSubMenu = submenu;
    }
    if let Some(icon) = icon {
        info.fMask |= MIIM_BITMAP;
        info.hbmpItem = icon.handle();
    }

    unsafe {
        let position = GetMenuItemCount(Some(menu)).max(0) as u32;
        if InsertMenuItemW(menu, position, true, &info).is_err() {
            log::warn!("Failed to add menu item {name}");
            if let Some(submenu) = submenu {
                let _ = DestroyMenu(submenu);
            }
        }
    }
}

fn append_inert(menu: HMENU, label: &str) {
    let text = wide(escape_mnemonics(label));
    unsafe {
        let _ = AppendMenuW(menu, MF_STRING | MF_GRAYED, 0, PCWSTR(text.as_ptr()));
    }
}

fn clear(menu: HMENU) {
    unsafe {
        while GetMenuItemCount(Some(menu)) > 0 {
            if DeleteMenu(menu, 0, MF_BYPOSITION).is_err() {
                break;
            }
        }
    }
}

/// `&` marks a keyboard mnemonic in menu text; file names need it literal.
fn escape_mnemonics(text: &str) -> String {
    text.replace('&', "&&")
}

/// Watches the modal menu loop for clicks on folder items, which the native
/// menu treats as "open submenu" and never reports as a command.
struct MenuFilterHook(HHOOK);

impl MenuFilterHook {
    unsafe fn install() -> Option<Self> {
        CLICKED_FOLDER.set(None);
        LAST_KEY_ESCAPE.set(false);
        FOCUS_LOST.set(false);
        SetWindowsHookExW(WH_MSGFILTER, Some(menu_filter_proc), None, GetCurrentThreadId())
            .ok()
            .map(Self)
    }
}

impl Drop for MenuFilterHook {
    fn drop(&mut self) {
        unsafe {
            let _ = UnhookWindowsHookEx(self.0);
        }
    }
}

unsafe extern "system" fn menu_filter_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code == MSGF_MENU as i32 && lparam.0 != 0 {
        let msg = &*(lparam.0 as *const MSG);
        match msg.message {
            WM_KEYDOWN => LAST_KEY_ESCAPE.set(msg.wParam.0 == VK_ESCAPE.0 as usize),
            WM_LBUTTONDOWN | WM_RBUTTONDOWN => LAST_KEY_ESCAPE.set(false),
            WM_LBUTTONUP => {
                LAST_KEY_ESCAPE.set(false);
                if let Some(command) = clicked_folder(msg) {
                    CLICKED_FOLDER.set(Some(command));
                    let _ = EndMenu();
                    return LRESULT(1);
                }
            }
            _ => {}
        }
    }
    CallNextHookEx(None, code, wparam, lparam)
}

unsafe fn clicked_folder(msg: &MSG) -> Option<u32> {
    let menu = HMENU(SendMessageW(msg.hwnd, MN_GETHMENU, None, None).0 as *mut _);
    if menu.is_invalid() {
        return None;
    }
    let position = MenuItemFromPoint(None, menu, msg.pt);
    if position < 0 || GetSubMenu(menu, position).is_invalid() {
        return None;
    }

    let mut info = MENUITEMINFOW {
        cbSize: std::mem::size_of::<MENUITEMINFOW>() as u32,
        fMask: MIIM_ID,
        ..Default::default()
    };
    GetMenuItemInfoW(menu, position as u32, true, &mut info).ok()?;
    (info.wID != 0).then_some(info.wID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    use foldermenu_core::icon::NoIcons;
    use foldermenu_core::lister::{DirectoryLister, ListError};

    struct FlatListing;

    impl DirectoryLister for FlatListing {
        fn list_dirs(&self, _path: &Path) -> Result<Vec<PathBuf>, ListError> {
            Ok(vec![PathBuf::from(r"C:\top\docs")])
        }

        fn list_files(&self, _path: &Path) -> Result<Vec<PathBuf>, ListError> {
            Ok(vec![PathBuf::from(r"C:\top\a.txt"), PathBuf::from(r"C:\top\b.txt")])
        }
    }

    #[test]
    fn command_ids_map_back_to_their_nodes() {
        let tree = MenuTree::build(Path::new(r"C:\top"), &FlatListing, &NoIcons);
        assert_eq!(tree.len(), 3);

        for entry in tree.entries(None) {
            let Entry::Node(id) = entry else {
                panic!("expected only nodes at the top level");
            };
            let command = command_id(id);
            assert_ne!(command, 0);
            assert_eq!(node_for_command(&tree, command), Some(id));
        }
    }

    #[test]
    fn zero_and_out_of_range_commands_select_nothing() {
        let tree = MenuTree::build(Path::new(r"C:\top"), &FlatListing, &NoIcons);
        assert_eq!(node_for_command(&tree, 0), None);
        assert_eq!(node_for_command(&tree, 4), None);
    }

    #[test]
    fn ampersands_are_doubled() {
        assert_eq!(escape_mnemonics("Tom & Jerry.mp4"), "Tom && Jerry.mp4");
        assert_eq!(escape_mnemonics("plain"), "plain");
    }
}
