//! Annotation page rendering.
//!
//! One templating component produces both page kinds the workflow needs:
//! pairwise conversation pages (turns grouped into same-day units) and
//! group-chat pages (a flat turn sequence). Everything about the dropdown
//! widgets comes from the [`DropdownConfig`] schema; the page layout, the
//! dependent-dropdown script and the client-side CSV export are shared.
//!
//! The output is a single self-contained HTML document: inline CSS, inline
//! JS, no external resources. Coders open it from disk, annotate, and click
//! Download to get a CSV of their selections.

use serde_json::Value;

use crate::annotate::config::DropdownConfig;
use crate::core::turns::{Turn, Unit};

/// Renders the annotation page for a pairwise conversation.
///
/// Turns of `user_i` align right; turn numbering is cumulative across
/// units. Each turn block carries `data-unit` / `data-turn` attributes that
/// the CSV export reads back.
pub fn render_conversation_page(
    user_i: &str,
    user_j: &str,
    units: &[Unit],
    configs: &[DropdownConfig],
) -> String {
    let chrome = PageChrome {
        title: format!("Conversation: {user_i} and {user_j}"),
        heading: format!("Conversation: {user_i} & {user_j}"),
        note: None,
        script_vars: format!(
            "// User variables\nvar user_i = {};\nvar user_j = {};",
            js_string(user_i),
            js_string(user_j)
        ),
        row_seed: PAIRWISE_ROW_SEED,
        key_columns: &["Unit", "Turn"],
        csv_download: format!("conversation_{user_i}_{user_j}_coded.csv"),
    };

    let mut blocks = String::new();
    let mut cumulative_turn = 1usize;
    for (unit_idx, unit) in units.iter().enumerate() {
        for (turn_idx, turn) in unit.turns().iter().enumerate() {
            let alignment = if turn.sender() == user_i {
                "right"
            } else {
                "left"
            };
            blocks.push_str(&format!(
                "<div class=\"turn {alignment}\" data-unit=\"{unit_idx}\" data-turn=\"{turn_idx}\">\n"
            ));
            blocks.push_str(&format!(
                "<strong>Turn {cumulative_turn} ({}):</strong><br>\n",
                escape_html(turn.sender())
            ));
            render_messages(&mut blocks, turn);
            render_dropdowns(
                &mut blocks,
                configs,
                &format!(" data-unit=\"{unit_idx}\" data-turn=\"{turn_idx}\""),
            );
            blocks.push_str("</div>\n");
            cumulative_turn += 1;
        }
    }

    render_page(&chrome, &blocks, configs)
}

/// Renders the annotation page for a group chat.
///
/// Turns of `main_user` align right; blocks carry `data-turn` /
/// `data-sender` attributes. Translations render under the original text
/// when they exist and differ.
pub fn render_group_page(
    chat_id: &str,
    main_user: &str,
    turns: &[Turn],
    configs: &[DropdownConfig],
) -> String {
    let chrome = PageChrome {
        title: format!("Group Chat: {chat_id}"),
        heading: format!("Group Chat: {chat_id}"),
        note: Some(format!(
            "Main user (messages on right): <strong>{}</strong>",
            escape_html(main_user)
        )),
        script_vars: format!(
            "// Chat variables\nvar chat_id = {};\nvar main_user = {};",
            js_string(chat_id),
            js_string(main_user)
        ),
        row_seed: GROUP_ROW_SEED,
        key_columns: &["Turn", "Sender"],
        csv_download: format!("group_chat_{}_coded.csv", safe_chat_id(chat_id)),
    };

    let mut blocks = String::new();
    for (turn_idx, turn) in turns.iter().enumerate() {
        let alignment = if turn.sender() == main_user {
            "right"
        } else {
            "left"
        };
        blocks.push_str(&format!(
            "<div class=\"turn {alignment}\" data-turn=\"{turn_idx}\" data-sender=\"{}\">\n",
            escape_html(turn.sender())
        ));
        blocks.push_str(&format!(
            "<strong>Turn {} ({}):</strong><br>\n",
            turn_idx + 1,
            escape_html(turn.sender())
        ));
        render_messages(&mut blocks, turn);
        render_dropdowns(&mut blocks, configs, &format!(" data-turn=\"{turn_idx}\""));
        blocks.push_str("</div>\n");
    }

    render_page(&chrome, &blocks, configs)
}

/// Reduces a chat id to filename-safe characters (alphanumerics, `_`, `-`).
pub fn safe_chat_id(chat_id: &str) -> String {
    chat_id
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-'))
        .collect()
}

// ============================================================================
// Shared page assembly
// ============================================================================

/// Per-kind page parameters; everything else is shared.
struct PageChrome {
    title: String,
    heading: String,
    /// Extra line under the heading; contains markup, caller escapes.
    note: Option<String>,
    /// Leading `var` declarations of the page script.
    script_vars: String,
    /// Script fragment seeding the CSV row from the turn div's key attributes.
    row_seed: &'static str,
    /// Leading CSV columns matching `row_seed`.
    key_columns: &'static [&'static str],
    /// Filename of the downloaded CSV.
    csv_download: String,
}

fn render_page(chrome: &PageChrome, blocks: &str, configs: &[DropdownConfig]) -> String {
    let mut html = String::with_capacity(blocks.len() + 8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&chrome.title)));
    html.push_str("<style>");
    html.push_str(PAGE_STYLE);
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str(&format!("<h2>{}</h2>\n", escape_html(&chrome.heading)));
    if let Some(note) = &chrome.note {
        html.push_str(&format!("<p>{note}</p>\n"));
    }
    html.push_str("<div class=\"clearfix\" id=\"content\">\n");
    html.push_str(&render_script(chrome, configs));
    html.push_str(blocks);
    html.push_str("<div class=\"clear\"></div>\n");
    html.push_str("<button class=\"download-button\" id=\"downloadCSVButton\">Download</button>\n");
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_messages(html: &mut String, turn: &Turn) {
    for msg in turn.messages() {
        html.push_str(&format!(
            "<div class=\"message\"><span class=\"timestamp\">{}</span> - <span class=\"text\">{}</span>",
            msg.timestamp.format("%Y-%m-%d %H:%M:%S"),
            escape_html(&msg.content)
        ));
        if let Some(translation) = msg.translation() {
            html.push_str(&format!(
                "<br><span class=\"translation\">[Translation: {}]</span>",
                escape_html(translation)
            ));
        }
        html.push_str("</div>\n");
    }
}

fn render_dropdowns(html: &mut String, configs: &[DropdownConfig], key_attrs: &str) {
    html.push_str("<div class=\"dropdown-container\">\n");
    for (i, config) in configs.iter().enumerate() {
        let cat = i + 1;
        let dependent = config.options.is_dependent();
        let container_class = if dependent {
            "category-group"
        } else {
            "dropdown-group-container"
        };

        html.push_str(&format!(
            "<div class=\"{container_class}\" data-cat=\"{cat}\"{key_attrs}>\n"
        ));

        // primary dropdown
        html.push_str(&format!("<div class=\"dropdown-group\" data-dd=\"{cat}\">\n"));
        html.push_str(&format!("<label>{}: </label>\n", escape_html(&config.label)));
        html.push_str(&format!(
            "<select class=\"turn-dropdown\" data-dd=\"{cat}\">\n"
        ));
        html.push_str(&options_markup(&config.primary_options()));
        html.push_str("</select>\n</div>\n");

        if dependent {
            // dependent dropdown, populated by script on selection
            html.push_str(
                "<div class=\"dropdown-group\" data-dd=\"dep\" style=\"display:none;\">\n\
                 <label>Detailed: </label>\n\
                 <select class=\"dependent-dropdown\" data-dd=\"dep\">\n\
                 <option value=\"\">--Select--</option>\n\
                 </select>\n</div>\n",
            );
            // free-text input shown for "Other"
            html.push_str(
                "<div class=\"dropdown-group\" data-dd=\"other\" style=\"display:none;\">\n\
                 <label>Please specify: </label>\n\
                 <input type=\"text\" class=\"other-input\" data-dd=\"other\" />\n\
                 </div>\n",
            );
        }

        html.push_str(&format!(
            "<button type=\"button\" class=\"add-button\" data-cat=\"{cat}\">{}</button>\n",
            escape_html(&config.button_label())
        ));
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");
}

fn options_markup(options: &[String]) -> String {
    let mut markup = String::from("<option value=\"\">--None--</option>\n");
    for option in options {
        let escaped = escape_html(option);
        markup.push_str(&format!("<option value=\"{escaped}\">{escaped}</option>\n"));
    }
    markup
}

// ============================================================================
// Page script
// ============================================================================

fn render_script(chrome: &PageChrome, configs: &[DropdownConfig]) -> String {
    let mut script = String::from("\n<script>\n");
    script.push_str(&chrome.script_vars);
    script.push_str("\n\n// Mappings for dependent dropdowns\nvar dependentMappings = {\n");
    for (i, config) in configs.iter().enumerate() {
        if let Some(mapping) = config.options.dependent_mapping_json() {
            script.push_str(&format!("    '{}': {mapping},\n", i + 1));
        }
    }
    script.push_str("};\n");
    script.push_str(SCRIPT_HANDLERS);

    // CSV download handler
    let headers: Vec<String> = csv_header(chrome.key_columns, configs)
        .iter()
        .map(|column| js_string(column))
        .collect();
    script.push_str(
        "\n    // --- CSV Download Functionality ---\n    \
         document.getElementById(\"downloadCSVButton\").addEventListener(\"click\", function() {\n        \
         var csvRows = [];\n        var headers = [",
    );
    script.push_str(&headers.join(", "));
    script.push_str(
        "];\n        csvRows.push(headers.join(\",\"));\n\n        \
         var turnDivs = document.querySelectorAll(\".turn\");\n        \
         turnDivs.forEach(function(turnDiv) {\n",
    );
    script.push_str(chrome.row_seed);
    for (i, config) in configs.iter().enumerate() {
        script.push_str(&csv_category_block(
            i + 1,
            &config.name,
            config.options.is_dependent(),
        ));
    }
    script.push_str(SCRIPT_CSV_TAIL_JOIN);
    script.push_str(&format!(
        "        link.setAttribute(\"download\", {});\n",
        js_string(&chrome.csv_download)
    ));
    script.push_str(SCRIPT_CSV_TAIL_CLICK);
    script
}

/// CSV column names: the page kind's key columns, then one column per
/// config plus a `_Detailed` column for dependent configs.
fn csv_header(key_columns: &[&str], configs: &[DropdownConfig]) -> Vec<String> {
    let mut header: Vec<String> = key_columns.iter().map(ToString::to_string).collect();
    for config in configs {
        header.push(config.column().to_string());
        if config.options.is_dependent() {
            header.push(format!("{}_Detailed", config.column()));
        }
    }
    header
}

fn csv_category_block(cat: usize, name: &str, dependent: bool) -> String {
    let mut block = format!(
        "\n            // Process category {cat}: {name}\n            \
         (function() {{\n                var cat = {cat};\n                \
         var isDependent = {dependent};\n"
    );
    block.push_str(CSV_CATEGORY_BODY);
    block
}

/// Embeds a string into the generated script as a JSON literal.
fn js_string(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const PAIRWISE_ROW_SEED: &str = r#"            var unit = turnDiv.getAttribute("data-unit") || "";
            var turn = turnDiv.getAttribute("data-turn") || "";
            var row = [unit, turn];
"#;

const GROUP_ROW_SEED: &str = r#"            var turn = turnDiv.getAttribute("data-turn") || "";
            var sender = turnDiv.getAttribute("data-sender") || "";
            var row = [turn, sender];
"#;

const SCRIPT_HANDLERS: &str = r#"
// Wait for the DOM to be fully loaded
document.addEventListener('DOMContentLoaded', function() {
    // --- Primary Dropdown Change Event for Dependent Dropdowns ---
    document.addEventListener('change', function(e) {
        if (e.target && e.target.classList.contains('turn-dropdown')) {
            var catId = e.target.getAttribute('data-dd');
            var selected = e.target.value;
            var catGroup = e.target.closest('[data-cat="' + catId + '"]');

            if (!catGroup) return;

            if (dependentMappings[catId]) {
                var depGroup = catGroup.querySelector('.dropdown-group[data-dd="dep"]');
                var otherGroup = catGroup.querySelector('.dropdown-group[data-dd="other"]');
                var depSelect = depGroup ? depGroup.querySelector('select') : null;

                if (selected) {
                    if (selected === "Other") {
                        if (depGroup) depGroup.style.display = "none";
                        if (otherGroup) otherGroup.style.display = "inline-block";
                    } else if (dependentMappings[catId][selected]) {
                        if (otherGroup) otherGroup.style.display = "none";
                        if (depSelect) {
                            depSelect.innerHTML = '<option value="">--Select--</option>';
                            dependentMappings[catId][selected].forEach(function(opt) {
                                var option = document.createElement("option");
                                option.value = opt;
                                option.text = opt;
                                depSelect.appendChild(option);
                            });
                            depGroup.style.display = "inline-block";
                        }
                    } else {
                        if (depGroup) depGroup.style.display = "none";
                        if (otherGroup) otherGroup.style.display = "none";
                        if (depSelect) depSelect.innerHTML = '<option value="">--Select--</option>';
                    }
                } else {
                    if (depGroup) depGroup.style.display = "none";
                    if (otherGroup) otherGroup.style.display = "none";
                    if (depSelect) depSelect.innerHTML = '<option value="">--Select--</option>';
                }
            }
        }
    });

    // --- Dynamic Add Button Functionality ---
    document.querySelectorAll('.add-button').forEach(function(button) {
        button.addEventListener('click', function() {
            var cat = this.getAttribute("data-cat");
            var container = this.parentElement;
            var isDependent = dependentMappings[cat] !== undefined;

            if (isDependent) {
                // For dependent dropdowns, clone the entire container
                var clone = container.cloneNode(true);
                clone.querySelectorAll('select, input').forEach(function(elem) {
                    elem.value = "";
                    elem.removeAttribute('id');
                });
                container.parentElement.appendChild(clone);
            } else {
                // For simple dropdowns, clone only the dropdown-group
                var originalGroup = container.querySelector('.dropdown-group');
                var clone = originalGroup.cloneNode(true);
                clone.querySelectorAll('select, input').forEach(function(elem) {
                    elem.value = "";
                    elem.removeAttribute('id');
                });
                container.insertBefore(clone, this);
            }
        });
    });
"#;

const CSV_CATEGORY_BODY: &str = r#"                var catGroups = turnDiv.querySelectorAll('[data-cat="' + cat + '"]');
                var primaryVals = [];
                var detailedVals = [];

                catGroups.forEach(function(group) {
                    var primary = group.querySelector('select[data-dd="' + cat + '"]');
                    if (primary && primary.value.trim() !== "") {
                        primaryVals.push(primary.value.trim());

                        if (isDependent) {
                            var detail = "";
                            var depSel = group.querySelector('.dropdown-group[data-dd="dep"] select');
                            var otherInp = group.querySelector('.dropdown-group[data-dd="other"] input');

                            if (otherInp && getComputedStyle(otherInp.parentElement).display !== "none" && otherInp.value.trim() !== "") {
                                detail = otherInp.value.trim();
                            } else if (depSel && getComputedStyle(depSel.parentElement).display !== "none" && depSel.value.trim() !== "") {
                                detail = depSel.value.trim();
                            }

                            if (detail !== "") {
                                detailedVals.push(detail);
                            }
                        }
                    }
                });

                row.push(primaryVals.join(";"));
                if (isDependent) {
                    row.push(detailedVals.join(";"));
                }
            })();
"#;

const SCRIPT_CSV_TAIL_JOIN: &str = r#"
            csvRows.push(row.join(","));
        });

        var csvContent = "data:text/csv;charset=utf-8," + csvRows.join("\n");
        var encodedUri = encodeURI(csvContent);
        var link = document.createElement("a");
        link.setAttribute("href", encodedUri);
"#;

const SCRIPT_CSV_TAIL_CLICK: &str = r#"        document.body.appendChild(link);
        link.click();
        document.body.removeChild(link);
    });
});
</script>
"#;

const PAGE_STYLE: &str = r#"
    body {
        font-family: Arial, sans-serif;
        background-color: #f9f9f9;
        margin: 20px;
    }
    h2 {
        color: #333;
    }
    .turn {
        margin: 10px 0;
        padding: 10px;
        border-radius: 8px;
        clear: both;
        overflow: auto;
    }
    .turn.left {
        background-color: #f0f0f0;
        text-align: left;
        float: left;
        max-width: 60%;
    }
    .turn.right {
        background-color: #dcf8c6;
        text-align: right;
        float: right;
        max-width: 60%;
    }
    .message {
        margin: 5px 0;
    }
    .timestamp {
        font-size: 0.8em;
        color: #555;
    }
    .translation {
        font-size: 1em;
        color: #666;
        font-style: italic;
    }
    .dropdown-container {
        margin-top: 10px;
        clear: both;
        font-size: 0.85em;
        font-style: italic;
        color: #444;
    }
    .category-group, .dropdown-group-container {
        padding: 5px;
        margin-bottom: 5px;
    }
    .dropdown-group {
        margin-bottom: 5px;
        display: inline-block;
        vertical-align: middle;
    }
    .dropdown-group label {
        font-weight: bold;
        margin-right: 5px;
    }
    .add-button {
        font-size: 0.75em;
        margin-left: 5px;
        vertical-align: middle;
    }
    .download-button {
        display: block;
        margin: 40px auto;
        padding: 10px 20px;
        font-size: 1em;
    }
    .clear {
        clear: both;
    }
"#;
