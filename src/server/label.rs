//! Self-printing 2in x 3in label page.

const LABEL_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>Imprimir Etiqueta</title>
  <style>
    @page {
      size: 2in 3in;
      margin: 0;
    }
    body {
      margin: 0;
      padding: 0;
      width: 2in;
      height: 3in;
    }
    img {
      width: 100%;
      height: auto;
      display: block;
    }
  </style>
</head>
<body>
  <img src="{image_url}" alt="Etiqueta">
  <script>
    window.onload = () => {
      window.print();
    };
  </script>
</body>
</html>
"#;

pub fn render_label_page(image_url: &str) -> String {
    LABEL_TEMPLATE.replace("{image_url}", &escape_attribute(image_url))
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embeds_image_with_fixed_page_size() {
        let page = render_label_page("https://cdn.example/a.png?w=1&h=2");
        assert!(page.contains(r#"<img src="https://cdn.example/a.png?w=1&amp;h=2""#));
        assert!(page.contains("size: 2in 3in;"));
        assert!(page.contains("window.print()"));
    }

    #[test]
    fn test_escapes_markup_in_url() {
        let page = render_label_page(r#"x" onerror="alert(1)"><script>"#);
        assert!(!page.contains("<script>\""));
        assert!(page.contains("&quot; onerror=&quot;alert(1)&quot;&gt;&lt;script&gt;"));
    }
}
