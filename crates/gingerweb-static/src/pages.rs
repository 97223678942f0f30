//! Template page rendering.
//!
//! Pages are the files with the page extension directly under the source
//! tree root. They are rendered through minijinja with an empty context, so
//! only includes, imports, macros and inheritance are expanded. Templates
//! referenced by a page resolve against the source tree.

use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{context, path_loader, AutoEscape, Environment};

use crate::error::BuildError;

/// Renders the top-level pages of a source tree.
///
/// Each renderer owns a fresh environment. Build one per build so every
/// build sees the current template sources.
pub struct PageRenderer {
    env: Environment<'static>,
    source_dir: PathBuf,
}

impl PageRenderer {
    /// Create a renderer loading templates from `source_dir`.
    pub fn new(source_dir: &Path) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(source_dir.to_path_buf()));
        env.set_keep_trailing_newline(true);
        // Pages are static markup; expression output is never escaped.
        env.set_auto_escape_callback(|_| AutoEscape::None);

        Self {
            env,
            source_dir: source_dir.to_path_buf(),
        }
    }

    /// Find the page names directly under the source tree, sorted.
    pub fn discover(&self, extension: &str) -> Result<Vec<String>, BuildError> {
        let read_err = |source| BuildError::ReadPages {
            path: self.source_dir.clone(),
            source,
        };

        let mut pages = Vec::new();
        for entry in fs::read_dir(&self.source_dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();

            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }

            match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => pages.push(name.to_string()),
                None => tracing::warn!("Skipping page with non UTF-8 name: {}", path.display()),
            }
        }

        pages.sort();
        Ok(pages)
    }

    /// Render a page with no template variables.
    pub fn render_page(&self, name: &str) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(name)?;
        tmpl.render(context! {})
    }
}

/// Render every page not in `exclude` into `output_dir`.
///
/// Returns the rendered page paths relative to the output tree.
pub fn render_pages(
    renderer: &PageRenderer,
    output_dir: &Path,
    extension: &str,
    exclude: &[String],
) -> Result<Vec<PathBuf>, BuildError> {
    let mut rendered = Vec::new();

    for name in renderer.discover(extension)? {
        if exclude.iter().any(|e| e == &name) {
            tracing::debug!("Skipping excluded page {}", name);
            continue;
        }

        let html = renderer
            .render_page(&name)
            .map_err(|source| BuildError::Render {
                page: name.clone(),
                source,
            })?;

        let dest = output_dir.join(&name);
        fs::write(&dest, html).map_err(|source| BuildError::WritePage {
            path: dest.clone(),
            source,
        })?;

        tracing::info!("Rendered {}", name);
        rendered.push(PathBuf::from(name));
    }

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn source_with(files: &[(&str, &str)]) -> tempfile::TempDir {
        let temp = tempdir().unwrap();
        for (name, content) in files {
            let path = temp.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        temp
    }

    #[test]
    fn renders_page_without_directives_verbatim() {
        let source = "<!DOCTYPE html>\n<html>\n  <body>{ not a tag }</body>\n</html>\n";
        let web = source_with(&[("index.html", source)]);

        let html = PageRenderer::new(web.path()).render_page("index.html").unwrap();

        assert_eq!(html, source);
    }

    #[test]
    fn expands_includes_and_inheritance() {
        let web = source_with(&[
            (
                "templates/base.html",
                "<main>{% block body %}{% endblock %}</main>{% include \"templates/footer.html\" %}",
            ),
            ("templates/footer.html", "<footer>ginger</footer>"),
            (
                "index.html",
                "{% extends \"templates/base.html\" %}{% block body %}hello{% endblock %}",
            ),
        ]);

        let html = PageRenderer::new(web.path()).render_page("index.html").unwrap();

        assert_eq!(html, "<main>hello</main><footer>ginger</footer>");
    }

    #[test]
    fn expands_macros() {
        let web = source_with(&[
            (
                "macros.html",
                "{% macro button(label) %}<button>{{ label }}</button>{% endmacro %}",
            ),
            (
                "index.html",
                "{% from \"macros.html\" import button %}{{ button(\"Go\") }}",
            ),
        ]);

        let html = PageRenderer::new(web.path()).render_page("index.html").unwrap();

        assert_eq!(html, "<button>Go</button>");
    }

    #[test]
    fn leaves_markup_in_expressions_unescaped() {
        let web = source_with(&[(
            "index.html",
            "{% macro card(body) %}<div>{{ body }}</div>{% endmacro %}\
             {{ card(\"<b>x</b>\") }}|{% set t = \"Tom & Jerry\" %}{{ t }}",
        )]);

        let html = PageRenderer::new(web.path()).render_page("index.html").unwrap();

        assert_eq!(html, "<div><b>x</b></div>|Tom & Jerry");
    }

    #[test]
    fn discovers_top_level_pages_only() {
        let web = source_with(&[
            ("index.html", ""),
            ("about.html", ""),
            ("styles/a.css", ""),
            ("templates/base.html", ""),
            ("notes.txt", ""),
        ]);

        let pages = PageRenderer::new(web.path()).discover("html").unwrap();

        assert_eq!(pages, vec!["about.html".to_string(), "index.html".to_string()]);
    }

    #[test]
    fn skips_excluded_pages() {
        let web = source_with(&[("index.html", "home"), ("test.html", "tests")]);
        let out = tempdir().unwrap();
        let renderer = PageRenderer::new(web.path());

        let rendered =
            render_pages(&renderer, out.path(), "html", &["test.html".to_string()]).unwrap();

        assert_eq!(rendered, vec![PathBuf::from("index.html")]);
        assert!(!out.path().join("test.html").exists());
    }

    #[test]
    fn missing_include_is_an_error() {
        let web = source_with(&[("index.html", "{% include \"nope.html\" %}")]);
        let out = tempdir().unwrap();
        let renderer = PageRenderer::new(web.path());

        let err = render_pages(&renderer, out.path(), "html", &[]).unwrap_err();

        assert!(matches!(err, BuildError::Render { ref page, .. } if page == "index.html"));
    }

    #[test]
    fn syntax_error_is_an_error() {
        let web = source_with(&[("index.html", "{% if %}")]);
        let out = tempdir().unwrap();
        let renderer = PageRenderer::new(web.path());

        assert!(render_pages(&renderer, out.path(), "html", &[]).is_err());
    }

    #[test]
    fn fresh_renderer_sees_updated_templates() {
        let web = source_with(&[
            ("index.html", "{% include \"part.html\" %}"),
            ("part.html", "v1"),
        ]);

        let first = PageRenderer::new(web.path()).render_page("index.html").unwrap();
        fs::write(web.path().join("part.html"), "v2").unwrap();
        let second = PageRenderer::new(web.path()).render_page("index.html").unwrap();

        assert_eq!(first, "v1");
        assert_eq!(second, "v2");
    }
}
