//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered inline, usually into the element targeted by an htmx request.

use axum::response::Html;
use maud::{Markup, html};

/// A success or error message with a line of details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    Success { message: String, details: String },
    Error { message: String, details: String },
}

const SUCCESS_STYLE: &str = "p-4 mb-4 rounded-lg border text-green-800 \
    border-green-300 bg-green-50 dark:bg-gray-800 dark:text-green-400 \
    dark:border-green-800";

const ERROR_STYLE: &str = "p-4 mb-4 rounded-lg border text-red-800 \
    border-red-300 bg-red-50 dark:bg-gray-800 dark:text-red-400 \
    dark:border-red-800";

impl Alert {
    pub fn into_markup(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, details),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
        };

        html! {
            div role="alert" class=(style)
            {
                p class="text-sm font-medium" { (message) }

                @if !details.is_empty()
                {
                    p class="mt-1 text-sm opacity-80" { (details) }
                }
            }
        }
    }

    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }
}
