//! Display messages published to the notebook client.

use serde::{Deserialize, Serialize};

/// Module mounted by the generated embed script.
// TODO: read the module name from the `module ... exposing` header of the unit.
pub const MAIN_MODULE: &str = "Main";

/// Prefix of the element id the compiled program is mounted into.
pub const MOUNT_ID_PREFIX: &str = "elm-div-";

/// MIME bundle of a display message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimeBundle {
    /// HTML markup
    #[serde(rename = "text/html", skip_serializing_if = "Option::is_none")]
    pub text_html: Option<String>,

    /// Script executed by the client
    #[serde(
        rename = "application/javascript",
        skip_serializing_if = "Option::is_none"
    )]
    pub application_javascript: Option<String>,
}

/// One `display_data` publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayData {
    pub data: MimeBundle,
    pub metadata: serde_json::Value,
}

impl DisplayData {
    /// Display carrying HTML markup.
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            data: MimeBundle {
                text_html: Some(html.into()),
                ..Default::default()
            },
            metadata: serde_json::json!({}),
        }
    }

    /// Display carrying a script.
    pub fn javascript(script: impl Into<String>) -> Self {
        Self {
            data: MimeBundle {
                application_javascript: Some(script.into()),
                ..Default::default()
            },
            metadata: serde_json::json!({}),
        }
    }
}

/// Element id for the program compiled during `execution_count`.
pub fn mount_id(execution_count: u32) -> String {
    format!("{}{}", MOUNT_ID_PREFIX, execution_count)
}

/// Preformatted panel for compiler output or a kernel diagnostic.
///
/// The text is inserted verbatim.
pub fn error_panel(message: &str) -> DisplayData {
    DisplayData::html(format!("<pre>{}</pre>", message))
}

/// Container element and embed script for a successful compile.
pub fn success_displays(javascript: &str, execution_count: u32) -> [DisplayData; 2] {
    let div_id = mount_id(execution_count);
    let container = DisplayData::html(format!("<div id=\"{}\"></div>", div_id));
    let script = DisplayData::javascript(embed_script(javascript, &div_id, MAIN_MODULE));
    [container, script]
}

/// Wrap compiled output so it defines `Elm` on a private object and mounts
/// `module_name` into the element with id `div_id`.
///
/// `define` is shadowed so the compiled bundle never registers itself with
/// an AMD loader present on the page.
fn embed_script(javascript: &str, div_id: &str, module_name: &str) -> String {
    format!(
        r#"
var defineElm = function(cb) {{
    if (this.Elm) {{
        this.oldElm = this.Elm;
    }}
    var define = null;

    {js}

    cb();
}}
;

var obj = new Object();
defineElm.bind(obj)(function(){{
    var mountNode = document.getElementById('{div_id}');
    obj.Elm.{module_name}.embed(mountNode);
}});
"#,
        js = javascript,
        div_id = div_id,
        module_name = module_name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_panel_is_verbatim() {
        let display = error_panel("-- TYPE MISMATCH --\n<bad>");
        assert_eq!(
            display.data.text_html.as_deref(),
            Some("<pre>-- TYPE MISMATCH --\n<bad></pre>")
        );
        assert!(display.data.application_javascript.is_none());
    }

    #[test]
    fn test_success_displays() {
        let [container, script] = success_displays("var x = 1;", 7);

        assert_eq!(
            container.data.text_html.as_deref(),
            Some("<div id=\"elm-div-7\"></div>")
        );

        let js = script.data.application_javascript.unwrap();
        assert!(js.contains("var x = 1;"));
        assert!(js.contains("document.getElementById('elm-div-7')"));
        assert!(js.contains("obj.Elm.Main.embed(mountNode)"));
        assert!(js.contains("var define = null;"));
    }

    #[test]
    fn test_mime_bundle_serialization() {
        let json = serde_json::to_value(DisplayData::javascript("1;")).unwrap();
        assert_eq!(json["data"]["application/javascript"], "1;");
        assert!(json["data"].get("text/html").is_none());
        assert_eq!(json["metadata"], serde_json::json!({}));
    }
}
