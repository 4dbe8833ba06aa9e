//! Card HTML: either a template's own layout with `{{...}}` placeholders, or
//! the built-in default layout.

use common::model::submission::{value_text, EmployeeData};
use regex::Regex;
use std::collections::BTreeMap;

/// Shown when the employee did not upload a photo.
const PHOTO_PLACEHOLDER: &str = "data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg' width='100' height='120'><rect width='100%' height='100%' fill='%23dddddd'/></svg>";

/// Employee keys that never get a row on the default layout.
const HIDDEN_KEYS: [&str; 3] = ["photo", "qrCode", "id"];

const DEFAULT_BACKGROUND: &str = "linear-gradient(135deg, #667eea 0%, #764ba2 100%)";

/// Everything a layout can reference.
#[derive(Debug, Clone)]
pub struct CardData<'a> {
    pub company_name: &'a str,
    pub company_logo: &'a str,
    pub brand_color: Option<&'a str>,
    pub employee: &'a EmployeeData,
    pub photo: Option<&'a str>,
    pub qr_code: &'a str,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl CardData<'_> {
    fn company_values(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("name", self.company_name.to_string()),
            ("logo", self.company_logo.to_string()),
            ("brandColor", self.brand_color.unwrap_or_default().to_string()),
        ])
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// Replaces `{{employee.<key>}}` and `{{company.<key>}}` for keys that exist,
/// then `{{photo}}` and `{{qrCode}}`. Unknown placeholders stay as written.
pub fn interpolate(layout: &str, data: &CardData<'_>) -> Result<String, regex::Error> {
    let company = data.company_values();
    let scoped = Regex::new(r"\{\{(employee|company)\.([^{}]+)\}\}")?;
    let with_values = scoped.replace_all(layout, |caps: &regex::Captures| {
        let key = &caps[2];
        let value = match &caps[1] {
            "employee" => data.employee.get(key).map(|v| value_text(v).unwrap_or_default()),
            _ => company.get(key).cloned(),
        };
        match value {
            Some(v) => escape_html(&v),
            None => caps[0].to_string(),
        }
    });

    Ok(with_values
        .replace("{{photo}}", &escape_html(data.photo.unwrap_or_default()))
        .replace("{{qrCode}}", data.qr_code))
}

/// Label for a default-layout row: underscores become spaces.
pub fn row_label(key: &str) -> String {
    key.replace('_', " ")
}

pub fn default_layout(data: &CardData<'_>) -> String {
    let rows: String = data
        .employee
        .iter()
        .filter(|(key, _)| !HIDDEN_KEYS.contains(&key.as_str()))
        .map(|(key, value)| {
            format!(
                r#"<div class="info-row"><div class="label">{}</div><div class="value">{}</div></div>"#,
                escape_html(&row_label(key)),
                escape_html(&value_text(value).unwrap_or_default())
            )
        })
        .collect();

    let logo = if data.company_logo.is_empty() {
        String::new()
    } else {
        format!(
            r#"<img src="{}" alt="Logo" class="logo" />"#,
            escape_html(data.company_logo)
        )
    };
    let photo = escape_html(data.photo.unwrap_or(PHOTO_PLACEHOLDER));
    let background = data
        .brand_color
        .map(escape_html)
        .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string());

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<style>
* {{ margin: 0; padding: 0; box-sizing: border-box; }}
body {{ width: {w}mm; height: {h}mm; font-family: Arial, sans-serif; background: white; }}
.card {{ width: {w}mm; height: {h}mm; background: {bg}; padding: 5mm; position: relative; color: white; overflow: hidden; display: flex; flex-direction: column; }}
.header {{ display: flex; align-items: center; gap: 3mm; margin-bottom: 4mm; border-bottom: 1px solid rgba(255,255,255,0.3); padding-bottom: 2mm; }}
.logo {{ width: 10mm; height: 10mm; object-fit: contain; background: white; border-radius: 50%; padding: 1mm; }}
.company-name {{ font-size: 3.5mm; font-weight: bold; text-transform: uppercase; letter-spacing: 0.5px; }}
.content {{ display: flex; gap: 4mm; flex: 1; }}
.photo {{ width: 25mm; height: 30mm; object-fit: cover; border: 1mm solid white; border-radius: 2mm; background: #eee; }}
.info-section {{ flex: 1; display: flex; flex-direction: column; gap: 2mm; }}
.label {{ font-size: 1.8mm; opacity: 0.8; text-transform: uppercase; margin-bottom: 0.5mm; }}
.value {{ font-size: 2.8mm; font-weight: bold; white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }}
.footer {{ position: absolute; bottom: 3mm; right: 3mm; background: white; padding: 1mm; border-radius: 1mm; }}
.qr-code {{ width: 12mm; height: 12mm; display: block; }}
</style>
</head>
<body>
<div class="card">
<div class="header">{logo}<div class="company-name">{company}</div></div>
<div class="content">
<div class="photo-section"><img src="{photo}" alt="Employee" class="photo" /></div>
<div class="info-section">{rows}</div>
</div>
<div class="footer"><img src="{qr}" alt="QR Code" class="qr-code" /></div>
</div>
</body>
</html>"#,
        w = data.width_mm,
        h = data.height_mm,
        bg = background,
        logo = logo,
        company = escape_html(data.company_name),
        photo = photo,
        rows = rows,
        qr = data.qr_code,
    )
}

/// Custom layout when the template has one, default layout otherwise.
pub fn card_html(custom: Option<&str>, data: &CardData<'_>) -> Result<String, regex::Error> {
    match custom {
        Some(layout) => interpolate(layout, data),
        None => Ok(default_layout(data)),
    }
}
