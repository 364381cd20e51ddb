use axum::response::Html;

use crate::config::Config;
use crate::flash::Flash;
use crate::models::{Item, ItemForm};

/// Statuses offered by the form selects. The stored set is open; an
/// unlisted current value is appended so edits never lose it.
const STATUS_CHOICES: &[&str] = &["active", "inactive", "pending"];

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f1f5f9;color:#0f172a}\
nav{background:#1e293b;padding:.75rem 1.5rem}\
nav a{color:#e2e8f0;text-decoration:none;margin-right:1.25rem;font-weight:500}\
main{max-width:60rem;margin:1.5rem auto;padding:0 1rem}\
table{width:100%;border-collapse:collapse;background:#fff}\
th,td{text-align:left;padding:.5rem .75rem;border-bottom:1px solid #e2e8f0}\
.flash{padding:.6rem 1rem;border-radius:.25rem;margin-bottom:1rem}\
.flash-success{background:#dcfce7;color:#166534}\
.flash-error{background:#fee2e2;color:#991b1b}\
.form label{display:block;margin:.75rem 0 .25rem;font-weight:600}\
.form input,.form textarea,.form select{width:100%;padding:.4rem;box-sizing:border-box}\
button,.button{background:#3b82f6;color:#fff;border:none;border-radius:.25rem;padding:.45rem .9rem;cursor:pointer;text-decoration:none;display:inline-block}\
button.danger{background:#dc2626}\
form.inline{display:inline}\
.muted{color:#64748b}";

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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

fn layout(title: &str, flash: Option<&Flash>, body: &str) -> Html<String> {
    let notice = flash
        .map(|f| {
            format!(
                r#"<div class="flash flash-{}">{}</div>"#,
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .unwrap_or_default();
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Item Service</title>
<style>{STYLE}</style>
</head>
<body>
<nav><a href="/">Items</a><a href="/create">New item</a><a href="/info">Info</a></nav>
<main>
{notice}
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    ))
}

pub fn index(items: &[Item], flash: Option<&Flash>) -> Html<String> {
    let mut body = format!(
        "<h1>Items <span class=\"muted\">({})</span></h1>\n",
        items.len()
    );
    if items.is_empty() {
        body.push_str(r#"<p class="muted">No items yet. <a href="/create">Create the first one.</a></p>"#);
    } else {
        body.push_str(
            "<table><thead><tr><th>Name</th><th>Description</th><th>Status</th>\
             <th>Created</th><th>Updated</th><th></th></tr></thead><tbody>\n",
        );
        for item in items {
            body.push_str(&format!(
                r#"<tr><td>{name}</td><td>{description}</td><td>{status}</td><td>{created}</td><td>{updated}</td><td><a class="button" href="/edit/{id}">Edit</a> <form class="inline" method="post" action="/delete/{id}"><button class="danger" type="submit">Delete</button></form></td></tr>
"#,
                name = escape(&item.name),
                description = escape(&item.description),
                status = escape(&item.status),
                created = escape(&item.created_at),
                updated = escape(&item.updated_at),
                id = escape(&item.id),
            ));
        }
        body.push_str("</tbody></table>");
    }
    layout("Items", flash, &body)
}

pub fn create_form(form: &ItemForm, flash: Option<&Flash>) -> Html<String> {
    let body = format!(
        "<h1>New item</h1>\n{}",
        item_form_fields("/create", form, "Create")
    );
    layout("New item", flash, &body)
}

pub fn edit_form(id: &str, form: &ItemForm, flash: Option<&Flash>) -> Html<String> {
    let body = format!(
        "<h1>Edit item</h1>\n<p class=\"muted\">id: {}</p>\n{}",
        escape(id),
        item_form_fields(&format!("/edit/{}", escape(id)), form, "Save")
    );
    layout("Edit item", flash, &body)
}

fn item_form_fields(action: &str, form: &ItemForm, submit: &str) -> String {
    let name = form.name.as_deref().unwrap_or_default();
    let description = form.description.as_deref().unwrap_or_default();
    let status = form.status.as_deref().unwrap_or("active");

    let mut options = String::new();
    for choice in STATUS_CHOICES {
        options.push_str(&format!(
            r#"<option value="{choice}"{selected}>{choice}</option>"#,
            selected = if *choice == status { " selected" } else { "" },
        ));
    }
    if !STATUS_CHOICES.contains(&status) {
        options.push_str(&format!(
            r#"<option value="{0}" selected>{0}</option>"#,
            escape(status)
        ));
    }

    format!(
        r#"<form class="form" method="post" action="{action}">
<label for="name">Name</label>
<input id="name" name="name" value="{name}" required>
<label for="description">Description</label>
<textarea id="description" name="description" rows="4">{description}</textarea>
<label for="status">Status</label>
<select id="status" name="status">{options}</select>
<p><button type="submit">{submit}</button> <a class="button" href="/">Cancel</a></p>
</form>"#,
        name = escape(name),
        description = escape(description),
    )
}

pub fn info(config: &Config, timestamp: &str) -> Html<String> {
    let body = format!(
        r#"<h1>System info</h1>
<table>
<tr><th>Container</th><td>{hostname}</td></tr>
<tr><th>AWS region</th><td>{region}</td></tr>
<tr><th>DynamoDB table</th><td>{table}</td></tr>
<tr><th>Environment</th><td>{environment}</td></tr>
<tr><th>Timestamp</th><td>{timestamp}</td></tr>
</table>"#,
        hostname = escape(&config.hostname),
        region = escape(&config.aws_region),
        table = escape(&config.table_name),
        environment = escape(&config.environment),
        timestamp = escape(timestamp),
    );
    layout("Info", None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> Item {
        Item {
            id: "abc-123".into(),
            name: "Widget <1>".into(),
            description: "A & B".into(),
            status: "active".into(),
            created_at: "2025-01-01T00:00:00.000000Z".into(),
            updated_at: "2025-01-01T00:00:00.000000Z".into(),
        }
    }

    #[test]
    fn escape_covers_html_metacharacters() {
        assert_eq!(
            escape(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn index_escapes_item_fields() {
        let Html(page) = index(&[sample_item()], None);
        assert!(page.contains("Widget &lt;1&gt;"));
        assert!(page.contains("A &amp; B"));
        assert!(!page.contains("Widget <1>"));
    }

    #[test]
    fn index_links_edit_and_delete_per_item() {
        let Html(page) = index(&[sample_item()], None);
        assert!(page.contains(r#"href="/edit/abc-123""#));
        assert!(page.contains(r#"action="/delete/abc-123""#));
    }

    #[test]
    fn empty_index_shows_placeholder() {
        let Html(page) = index(&[], None);
        assert!(page.contains("No items yet"));
    }

    #[test]
    fn flash_notice_is_rendered_with_level_class() {
        let Html(page) = index(&[], Some(&Flash::error("Error loading items")));
        assert!(page.contains(r#"class="flash flash-error""#));
        assert!(page.contains("Error loading items"));
    }

    #[test]
    fn edit_form_prefills_submitted_values() {
        let form = ItemForm {
            name: Some("Widget".into()),
            description: Some("desc".into()),
            status: Some("archived".into()),
        };
        let Html(page) = edit_form("abc-123", &form, None);
        assert!(page.contains(r#"action="/edit/abc-123""#));
        assert!(page.contains(r#"value="Widget""#));
        assert!(page.contains(">desc</textarea>"));
        // unlisted status still selectable
        assert!(page.contains(r#"<option value="archived" selected>"#));
    }

    #[test]
    fn create_form_defaults_status_to_active() {
        let Html(page) = create_form(&ItemForm::default(), None);
        assert!(page.contains(r#"<option value="active" selected>"#));
    }
}
