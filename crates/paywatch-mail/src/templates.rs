//! Email bodies for test messages, critical alerts and the daily digest.

use chrono::NaiveDate;

use paywatch_entity::notification::{Notification, NotificationPriority};
use paywatch_entity::recipient::{Language, Recipient};

/// Subject and bodies of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Renders PayWatch emails in the recipient's language.
#[derive(Debug, Clone, Default)]
pub struct EmailComposer {
    product_name: String,
}

impl EmailComposer {
    /// Create a composer that signs messages with `product_name`.
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
        }
    }

    /// Connectivity check message.
    pub fn test_email(&self, language: Language) -> ComposedEmail {
        let (subject, body) = match language {
            Language::Tr => (
                format!("{} - Test E-postası", self.product_name),
                "E-posta bildirimleri doğru şekilde yapılandırıldı.",
            ),
            Language::En => (
                format!("{} - Test Email", self.product_name),
                "Email notifications are configured correctly.",
            ),
        };
        let blocks = format!("<p>{}</p>", escape_html(body));
        self.finish(subject, &blocks)
    }

    /// Immediate alert for one high-priority notification.
    pub fn critical_alert(&self, notification: &Notification, language: Language) -> ComposedEmail {
        let label = match language {
            Language::Tr => "Acil Bildirim",
            Language::En => "Urgent Notification",
        };
        let subject = format!("{label}: {}", notification.title);
        let blocks = format!(
            "<h2>{}</h2>\n<p>{}</p>",
            escape_html(&notification.title),
            escape_html(&notification.message)
        );
        self.finish(subject, &blocks)
    }

    /// Summary of a recipient's open notifications; `None` when there is nothing to report.
    pub fn daily_digest(
        &self,
        recipient: &Recipient,
        notifications: &[Notification],
        date: NaiveDate,
    ) -> Option<ComposedEmail> {
        if notifications.is_empty() {
            return None;
        }

        let language = recipient.preferred_language();
        let date_label = date.format("%d.%m.%Y");
        let (subject, greeting, intro) = match language {
            Language::Tr => (
                format!("{} - Günlük Özet ({date_label})", self.product_name),
                format!("Merhaba {},", recipient.display_name()),
                format!("{} bekleyen bildiriminiz var.", notifications.len()),
            ),
            Language::En => (
                format!("{} - Daily Summary ({date_label})", self.product_name),
                format!("Hello {},", recipient.display_name()),
                format!("You have {} pending notifications.", notifications.len()),
            ),
        };

        let items: String = notifications
            .iter()
            .map(|n| {
                let marker = if n.priority == NotificationPriority::High {
                    "&#9888; "
                } else {
                    ""
                };
                format!(
                    "<li>{marker}<strong>{}</strong><br>{}</li>\n",
                    escape_html(&n.title),
                    escape_html(&n.message)
                )
            })
            .collect();

        let blocks = format!(
            "<p>{}</p>\n<p>{}</p>\n<ul>\n{items}</ul>",
            escape_html(&greeting),
            escape_html(&intro)
        );
        Some(self.finish(subject, &blocks))
    }

    fn finish(&self, subject: String, blocks: &str) -> ComposedEmail {
        let html = format!(
            "<!DOCTYPE html>\n<html>\n<body style=\"font-family: sans-serif;\">\n{blocks}\n<hr>\n<p><small>{}</small></p>\n</body>\n</html>",
            escape_html(&self.product_name)
        );
        let text = strip_html(&html);
        ComposedEmail {
            subject,
            html,
            text,
        }
    }
}

/// Escape text for inclusion in HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Plain-text fallback: drop tags and collapse whitespace.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
