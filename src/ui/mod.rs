//! Server-rendered HTML pages.
//!
//! Pages are plain HTML strings; all client behavior lives in
//! `static/chat.js`, which the chat page loads.
//!
//! # Structure
//!
//! - [`landing`]: marketing page at `/`
//! - [`chat`]: thread sidebar and conversation view at `/chat`

pub mod chat;
pub mod landing;

/// Product name shown in titles and the navigation bar.
pub const BRAND: &str = "AIChat";

/// Wrap page content in the document shell shared by every page.
pub fn html_shell(title: &str, body_class: &str, content: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1, maximum-scale=1">
    <meta name="description" content="aibot - intelligent AI assistant">
    <meta name="theme-color" content="#ffffff">
    <title>{title} - aibot</title>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body class="{body_class}">
{content}
</body>
</html>"##
    )
}
