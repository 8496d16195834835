//! Chat page.
//!
//! The markup is a static skeleton: the thread list, the message list and the
//! header title are filled in by `static/chat.js`, which keeps every thread in
//! browser memory.

use super::html_shell;

/// Sidebar width bounds, in pixels, enforced by the resize handle.
pub const SIDEBAR_MIN_WIDTH: u32 = 200;
pub const SIDEBAR_MAX_WIDTH: u32 = 600;
pub const SIDEBAR_DEFAULT_WIDTH: u32 = 300;

/// Render the chat page.
pub fn render() -> String {
    let content = format!(
        r#"<div class="chat-app" id="chat-app"
     data-endpoint="/api/chat"
     data-sidebar-min="{SIDEBAR_MIN_WIDTH}"
     data-sidebar-max="{SIDEBAR_MAX_WIDTH}">
    <aside class="sidebar" id="sidebar" style="width: {SIDEBAR_DEFAULT_WIDTH}px">
        <div class="sidebar-actions">
            <button type="button" id="new-thread" class="btn btn-primary btn-block">+ New chat</button>
        </div>
        <ul class="thread-list" id="thread-list" aria-label="Conversations"></ul>
        <div class="resize-handle" id="resize-handle" role="separator" aria-orientation="vertical"></div>
    </aside>

    <main class="conversation">
        <header class="conversation-header">
            <h1 id="thread-title">AI Assistant</h1>
        </header>

        <div class="message-list" id="message-list" aria-live="polite" aria-label="Chat messages"></div>

        <form class="composer" id="composer" autocomplete="off">
            <input type="text" name="message" id="message-input" placeholder="Type a message...">
            <button type="submit" id="send-button" class="btn btn-primary" aria-label="Send">Send</button>
        </form>
    </main>
</div>
<script src="/static/chat.js" defer></script>"#
    );

    html_shell("Chat", "page-chat", &content)
}
