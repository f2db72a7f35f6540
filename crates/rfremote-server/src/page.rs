//! Human-readable introspection page.

use std::fmt::Write as _;
use std::net::SocketAddr;

use rfremote_keywords::{Keyword, KeywordRegistry, ParamSpec};

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f6f7f9;color:#1d2330}\
header{background:#1d2330;color:#fff;padding:20px 28px}\
header h1{margin:0;font-size:22px}\
header p{margin:6px 0 0;color:#9aa4b5;font-size:13px}\
main{max-width:960px;margin:0 auto;padding:20px 28px}\
.toolbar{display:flex;gap:12px;align-items:center;margin-bottom:16px}\
#filter{flex:1;padding:8px 10px;font-size:14px;border:1px solid #c6ccd6;border-radius:6px}\
#count{color:#5a6576;font-size:13px;white-space:nowrap}\
section{background:#fff;border:1px solid #e1e5eb;border-radius:8px;margin-bottom:18px;overflow:hidden}\
section h2{margin:0;padding:12px 16px;font-size:16px;border-bottom:1px solid #e1e5eb}\
table{width:100%;border-collapse:collapse}\
td{padding:10px 16px;border-top:1px solid #eef0f4;vertical-align:top;font-size:14px}\
td.name{font-family:ui-monospace,monospace;white-space:nowrap;width:1%}\
td.args{color:#5a6576;font-family:ui-monospace,monospace;font-size:13px}\
td.doc{color:#3c4657}\
ul.argdocs{margin:6px 0 0;padding-left:18px;color:#5a6576;font-size:13px}\
.hidden{display:none}";

const SCRIPT: &str = "\
const filter=document.getElementById('filter');\
const count=document.getElementById('count');\
const rows=Array.from(document.querySelectorAll('tr.kw'));\
const total=rows.length;\
function apply(){\
const needle=filter.value.toLowerCase();\
let shown=0;\
for(const row of rows){\
const hit=row.textContent.toLowerCase().includes(needle);\
row.classList.toggle('hidden',!hit);\
if(hit)shown++;\
}\
for(const section of document.querySelectorAll('section')){\
const any=section.querySelector('tr.kw:not(.hidden)')!==null;\
section.classList.toggle('hidden',!any);\
}\
count.textContent=shown+' of '+total+' keywords';\
}\
filter.addEventListener('input',apply);\
apply();";

/// Renders the introspection page for the current registry contents.
pub(crate) fn render(registry: &KeywordRegistry, addr: SocketAddr) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str("<title>Remote keyword server</title>");
    let _ = write!(html, "<style>{STYLE}</style>");
    html.push_str("</head><body>");
    let _ = write!(
        html,
        "<header><h1>Remote keyword server</h1><p>listening on {addr}</p></header>"
    );
    html.push_str("<main><div class=\"toolbar\">");
    html.push_str("<input id=\"filter\" type=\"search\" placeholder=\"Filter keywords\" autocomplete=\"off\">");
    html.push_str("<span id=\"count\"></span></div>");

    let snapshot = registry.snapshot();
    if snapshot.is_empty() {
        html.push_str("<p>No libraries are loaded.</p>");
    }
    for (library, keywords) in &snapshot {
        let _ = write!(html, "<section><h2>{}</h2><table>", escape(library));
        for keyword in keywords {
            write_row(&mut html, keyword);
        }
        html.push_str("</table></section>");
    }

    html.push_str("</main>");
    let _ = write!(html, "<script>{SCRIPT}</script>");
    html.push_str("</body></html>");
    html
}

fn write_row(html: &mut String, keyword: &Keyword) {
    html.push_str("<tr class=\"kw\">");
    let _ = write!(html, "<td class=\"name\">{}</td>", escape(keyword.name()));
    let args: Vec<String> = keyword.params().iter().map(describe_param).collect();
    let _ = write!(html, "<td class=\"args\">{}</td>", escape(&args.join(", ")));
    html.push_str("<td class=\"doc\">");
    html.push_str(&escape(keyword.doc()));
    let documented: Vec<&ParamSpec> = keyword
        .params()
        .iter()
        .filter(|p| !p.doc.is_empty())
        .collect();
    if !documented.is_empty() {
        html.push_str("<ul class=\"argdocs\">");
        for param in documented {
            let _ = write!(
                html,
                "<li><b>{}</b>: {}</li>",
                escape(&param.name),
                escape(&param.doc)
            );
        }
        html.push_str("</ul>");
    }
    html.push_str("</td></tr>");
}

fn describe_param(param: &ParamSpec) -> String {
    match &param.default {
        Some(default) => format!("{} ({}, default {})", param.name, param.kind.name(), default),
        None => format!("{} ({})", param.name, param.kind.name()),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rfremote_core::{ReturnValue, Value};
    use rfremote_keywords::{KeywordLibrary, KeywordSpec, ParamKind, ReturnKind, StaticLoader};

    use super::*;

    struct Demo;

    impl KeywordLibrary for Demo {
        fn keywords(&self) -> Vec<KeywordSpec> {
            vec![KeywordSpec::new("SayHello", |_args, _ctx| {
                Ok(ReturnValue::Str("<hi>".into()))
            })
            .doc("Greets & waves.")
            .param("name", ParamKind::Str)
            .arg_doc("name", "who to greet")
            .optional_param("times", ParamKind::Int32, Value::Int32(1))
            .returns(ReturnKind::Str)]
        }
    }

    fn registry() -> KeywordRegistry {
        let mut loader = StaticLoader::new();
        loader.register("demo", || Arc::new(Demo));
        let registry = KeywordRegistry::new(Arc::new(loader));
        registry.load_library("demo", "demo", None).unwrap();
        registry
    }

    fn addr() -> SocketAddr {
        "127.0.0.1:8270".parse().unwrap()
    }

    #[test]
    fn page_lists_libraries_and_keywords() {
        let html = render(&registry(), addr());
        assert!(html.contains("<h2>demo</h2>"));
        assert!(html.contains("say_hello"));
        assert!(html.contains("times (int32, default 1)"));
        assert!(html.contains("who to greet"));
        assert!(html.contains("listening on 127.0.0.1:8270"));
    }

    #[test]
    fn page_has_filter_controls() {
        let html = render(&registry(), addr());
        assert!(html.contains("id=\"filter\""));
        assert!(html.contains("id=\"count\""));
        assert!(html.contains("addEventListener"));
    }

    #[test]
    fn registry_text_is_escaped() {
        let html = render(&registry(), addr());
        assert!(html.contains("Greets &amp; waves."));
        assert!(!html.contains("Greets & waves."));
    }

    #[test]
    fn empty_registry_renders_a_notice() {
        let registry = KeywordRegistry::new(Arc::new(StaticLoader::new()));
        let html = render(&registry, addr());
        assert!(html.contains("No libraries are loaded."));
    }

    #[test]
    fn escape_covers_the_specials() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
