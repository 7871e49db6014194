//! Static HTML info page, one per downloaded model.
//!
//! `render` is pure: it only formats its inputs. The page lives in the same
//! folder as the preview images, so the gallery uses bare file names.

use crate::catalog::{ModelRecord, VersionRecord};
use std::fmt::Write;
use std::path::{Path, PathBuf};

const NO_DESCRIPTION: &str = "No description available";

const STYLE: &str = r#"
    body { font-family: system-ui, sans-serif; line-height: 1.6; margin: 0; padding: 20px; background: #eef0f4; }
    .container { max-width: 1100px; margin: 0 auto; background: #fff; border-radius: 12px; box-shadow: 0 6px 24px rgba(0,0,0,0.15); overflow: hidden; }
    .header { background: #2c3e50; color: #fff; padding: 28px; text-align: center; }
    .header h1 { margin: 0; font-weight: 300; }
    .model-info { display: grid; grid-template-columns: repeat(auto-fit, minmax(280px, 1fr)); gap: 18px; padding: 28px; background: #f8f9fa; }
    .info-card { background: #fff; padding: 18px; border-radius: 8px; box-shadow: 0 1px 6px rgba(0,0,0,0.08); }
    .info-card h3 { margin-top: 0; border-bottom: 2px solid #3498db; padding-bottom: 8px; }
    .content { padding: 28px; }
    .description { background: #f8f9fa; padding: 18px; border-radius: 8px; border-left: 4px solid #3498db; }
    .description.empty { color: #888; font-style: italic; }
    .tag { display: inline-block; background: #3498db; color: #fff; padding: 4px 12px; margin: 3px; border-radius: 16px; font-size: 0.9em; }
    .trained-words { background: #fff8e1; border: 1px solid #ffe082; border-radius: 8px; padding: 18px; margin: 20px 0; }
    .trained-words code { background: #2c3e50; color: #ecf0f1; padding: 3px 8px; border-radius: 4px; margin: 2px; display: inline-block; }
    .image-gallery { display: grid; grid-template-columns: repeat(auto-fit, minmax(280px, 1fr)); gap: 18px; margin: 24px 0; }
    .image-gallery img { width: 100%; height: 300px; object-fit: cover; border-radius: 8px; cursor: pointer; }
    .modal { display: none; position: fixed; z-index: 1000; inset: 0; background: rgba(0,0,0,0.9); }
    .modal-content { display: block; margin: 4vh auto; max-width: 92%; max-height: 92vh; }
    .close { position: absolute; top: 12px; right: 32px; color: #f1f1f1; font-size: 40px; font-weight: bold; cursor: pointer; }
    .source-link { word-break: break-all; color: #3498db; }
"#;

/// Click-to-enlarge viewer for the gallery.
const IMAGE_MODAL: &str = r#"<div id="imageModal" class="modal" onclick="if (event.target === this) closeModal()">
    <span class="close" onclick="closeModal()">&times;</span>
    <img class="modal-content" id="modalImage" alt="Preview image">
  </div>
  <script>
    function openModal(src) {
      document.getElementById('imageModal').style.display = 'block';
      document.getElementById('modalImage').src = src;
    }
    function closeModal() {
      document.getElementById('imageModal').style.display = 'none';
    }
    document.addEventListener('keydown', function (e) {
      if (e.key === 'Escape') closeModal();
    });
  </script>"#;

/// Minimal HTML escaping for text and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Path of an image relative to the page, falling back to its file name.
fn relative_src(target_dir: &Path, image: &Path) -> String {
    image
        .strip_prefix(target_dir)
        .ok()
        .or_else(|| image.file_name().map(Path::new))
        .unwrap_or(image)
        .to_string_lossy()
        .replace('\\', "/")
}

fn trained_words_block(words: &[String]) -> String {
    let words: Vec<&String> = words.iter().filter(|w| !w.trim().is_empty()).collect();
    if words.is_empty() {
        return String::new();
    }
    let mut html = String::from(
        "<div class=\"trained-words\">\n      <h3>Trained Words / Triggers</h3>\n",
    );
    for word in words {
        let _ = writeln!(html, "      <code>{}</code>", escape(word));
    }
    html.push_str("    </div>\n");
    html
}

fn tags_block(tags: &[String]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let mut html = String::from("<h3>Tags</h3>\n    <div class=\"tags\">\n");
    for tag in tags {
        let _ = writeln!(html, "      <span class=\"tag\">{}</span>", escape(tag));
    }
    html.push_str("    </div>\n");
    html
}

fn gallery_block(target_dir: &Path, images: &[PathBuf]) -> String {
    if images.is_empty() {
        return "<p>No preview images available</p>\n".to_string();
    }
    let mut html = String::from("<h3>Preview Images</h3>\n    <div class=\"image-gallery\">\n");
    for image in images {
        let _ = writeln!(
            html,
            "      <img src=\"{}\" alt=\"Preview image\" loading=\"lazy\" onclick=\"openModal(this.src)\">",
            escape(&relative_src(target_dir, image))
        );
    }
    html.push_str("    </div>\n");
    html
}

fn source_block(original_url: Option<&str>) -> String {
    match original_url.filter(|u| !u.trim().is_empty()) {
        Some(url) => {
            let url = escape(url);
            format!(
                "<div class=\"info-card\">\n        <h3>Original Source</h3>\n        \
                 <a href=\"{url}\" target=\"_blank\" class=\"source-link\">{url}</a>\n      </div>"
            )
        }
        None => String::new(),
    }
}

/// Render the info page for one model version.
///
/// Descriptions are inserted as-is: the catalog already serves them as HTML.
pub fn render(
    model: &ModelRecord,
    version: &VersionRecord,
    target_dir: &Path,
    images: &[PathBuf],
    original_url: Option<&str>,
) -> String {
    let name = escape(&model.display_name(&model.id.map(|id| id.to_string()).unwrap_or_default()));
    let version_name = if version.name.trim().is_empty() {
        "Unknown Version".to_string()
    } else {
        escape(&version.name)
    };
    let base_model = if version.base_model.trim().is_empty() {
        "Unknown".to_string()
    } else {
        escape(&version.base_model)
    };

    let version_description = if version.description.trim().is_empty() {
        String::new()
    } else {
        format!(
            "<p><strong>Version Description:</strong> {}</p>",
            version.description
        )
    };

    let description = if model.description.trim().is_empty() {
        format!("<div class=\"description empty\"><p>{}</p></div>", NO_DESCRIPTION)
    } else {
        format!(
            "<div class=\"description\"><h3>Description</h3>{}</div>",
            model.description
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{name}</title>
  <style>{style}</style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>{name}</h1>
      <p>Version: {version_name}</p>
    </div>
    <div class="model-info">
      <div class="info-card">
        <h3>Model Information</h3>
        <p><strong>Type:</strong> {model_type}</p>
        <p><strong>Base Model:</strong> {base_model}</p>
      </div>
      <div class="info-card">
        <h3>Version Details</h3>
        <p><strong>Version Name:</strong> {version_name}</p>
        {version_description}
      </div>
      {source}
    </div>
    <div class="content">
    {description}
    {trained_words}
    {tags}
    {gallery}
    </div>
  </div>
  {modal}
</body>
</html>
"#,
        name = name,
        style = STYLE,
        version_name = version_name,
        model_type = escape(&model.model_type.to_string()),
        base_model = base_model,
        version_description = version_description,
        source = source_block(original_url),
        description = description,
        trained_words = trained_words_block(&version.trained_words),
        tags = tags_block(&model.tags),
        gallery = gallery_block(target_dir, images),
        modal = IMAGE_MODAL,
    )
}
