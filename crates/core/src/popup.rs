use std::borrow::Cow;

use crate::attributes::{ParkAttributes, display_value};

pub const PROPERTIES_HEADING: &str = "Properties";

/// Text of a park popup before it is turned into HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupContent {
    pub title: String,
    pub subtitle: String,
    pub rows: Vec<(String, String)>,
}

impl PopupContent {
    pub fn from_attributes(attributes: &ParkAttributes) -> Self {
        Self {
            title: attributes.name.clone(),
            subtitle: attributes.country.clone(),
            rows: attributes
                .extra
                .iter()
                .map(|(key, value)| (key.clone(), display_value(value)))
                .collect(),
        }
    }

    /// Plain-text lines in display order: title, subtitle, heading, rows.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.title.clone(),
            self.subtitle.clone(),
            format!("{PROPERTIES_HEADING}:"),
        ];
        lines.extend(self.rows.iter().map(|(key, value)| format!("{key}: {value}")));
        lines
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str(&format!("<strong>{}</strong><br>", escape_html(&self.title)));
        html.push_str(&format!("<em>{}</em><br>", escape_html(&self.subtitle)));
        html.push_str(&format!("<strong>{PROPERTIES_HEADING}:</strong>"));
        // the section is always present, even with no rows
        html.push_str("<div class=\"park-properties\">");
        for (key, value) in &self.rows {
            html.push_str(&format!(
                "<div>{}: {}</div>",
                escape_html(key),
                escape_html(value)
            ));
        }
        html.push_str("</div>");
        html
    }
}

fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
