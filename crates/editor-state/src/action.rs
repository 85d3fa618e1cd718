//! The contract boundary between an input layer (keystroke decoding,
//! out of scope here) and [`crate::TextView`]. The input layer's job is
//! turning raw escape sequences into one of these; `TextView::dispatch`
//! does the rest.

/// One user-facing editing action. Mirrors `original_source/config.h`'s
/// keymap targets, minus the multi-view and file-picker actions that
/// depend on a window manager this crate doesn't have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    SaveFile,
    SaveFileAs,
    OpenFile,
    DeleteLine,
    Undo,
    Redo,
    Copy,
    Paste,
    Cut,
    SelectionToggle,
    JumpNextSearchHit,
    JumpPrevSearchHit,
    Backspace,
    WordBackspace,
    DeleteForward,
    Enter,
    Tab,
    CursorDown,
    CursorUp,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    ScrollUp,
    ScrollDown,
    CursorWordJumpLeft,
    CursorWordJumpRight,
    CursorPageUp,
    CursorPageDown,
    LineIndentLeft,
    LineIndentRight,
    LineMoveBackward,
    LineMoveForward,
    /// Opens the interactive multi-purpose command line (e.g. `:goto`).
    /// Its sub-language is an input-layer concern; `TextView::dispatch`
    /// treats it as a no-op since there's nowhere in this crate for the
    /// resulting command to land.
    MultiPurposeCommand,
    /// Opens a new view onto a (possibly different) file. No-op here:
    /// this crate models a single `TextView`, not the multi-view manager
    /// that would own a collection of them.
    NewTextView,
    ChangeActiveView(u8),
    InsertChar(u8),
}
