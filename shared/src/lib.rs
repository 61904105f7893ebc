use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ===== SELECTOR OPTIONS =====

/// One selectable choice in a `<select>`.
///
/// `attributes` mirrors the option's `data-*` attributes in dataset form
/// (`data-district-id` -> `districtId`), in document order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    #[serde(default)]
    pub disabled: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            attributes: IndexMap::new(),
            disabled: false,
        }
    }

    /// "No selection" entry that always heads a selector.
    pub fn placeholder(label: impl Into<String>) -> Self {
        Self::new("", label)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Attribute value, empty when the option does not carry it.
    pub fn attribute(&self, key: &str) -> &str {
        self.attributes.get(key).map(String::as_str).unwrap_or("")
    }

    /// Key used by label de-duplication.
    pub fn label_key(&self) -> String {
        self.label.trim().to_lowercase()
    }
}

// ===== LOOKUP PAYLOADS =====

/// Generic `{ ok, <items_field>: [...], error? }` envelope returned by the
/// lookup endpoints. Everything besides `ok` and `error` stays in `fields`
/// so callers pick the array they were configured for.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LookupPayload {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub fields: IndexMap<String, Value>,
}

impl LookupPayload {
    /// Items stored under `items_field`. A missing or `null` field is an
    /// empty list; anything else that is not an array of records is an error.
    pub fn items(&self, items_field: &str) -> Result<Vec<LookupItem>, String> {
        match self.fields.get(items_field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(values)) => values
                .iter()
                .map(|value| {
                    serde_json::from_value::<LookupItem>(value.clone())
                        .map_err(|error| format!("invalid item in '{}': {}", items_field, error))
                })
                .collect(),
            Some(other) => Err(format!(
                "field '{}' is not an array (found {})",
                items_field,
                json_kind(other)
            )),
        }
    }

    /// Top-level field rendered the way option attributes are.
    pub fn field_text(&self, key: &str) -> Option<String> {
        self.fields.get(key).map(attribute_text)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LookupItem {
    pub id: Value,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub fields: IndexMap<String, Value>,
}

impl LookupItem {
    pub fn id_text(&self) -> String {
        attribute_text(&self.id)
    }

    /// Field lookup used by label templates; `id` and `name` resolve too.
    pub fn field_text(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id_text()),
            "name" => Some(self.name.clone()),
            _ => self.fields.get(key).map(attribute_text),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PendingCounts {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub pending_manage_leave_count: u32,
    #[serde(default)]
    pub pending_profile_update_count: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NotificationsPayload {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub notifications: Vec<NotificationEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NotificationEntry {
    pub id: Value,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

impl NotificationEntry {
    pub fn id_text(&self) -> String {
        attribute_text(&self.id)
    }
}

/// Response of the mark-read endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ReadReceipt {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub unread_count: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ApproversPayload {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub steps: Vec<ApproverStep>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ApproverStep {
    #[serde(default)]
    pub step: Value,
    #[serde(default)]
    pub approvers: Vec<Approver>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Approver {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sequence: Value,
    #[serde(default)]
    pub sequence_type: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub bps_from: Option<i64>,
    #[serde(default)]
    pub bps_to: Option<i64>,
}

impl Approver {
    /// Approvers only act for employees inside their BPS range (open ends default to 0..=999).
    pub fn covers_bps(&self, employee_bps: i64) -> bool {
        (self.bps_from.unwrap_or(0)..=self.bps_to.unwrap_or(999)).contains(&employee_bps)
    }
}

// ===== CONFIG TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PortalConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub polling: PollingSection,
    #[serde(default)]
    pub leave_form: LeaveFormSection,
    #[serde(default)]
    pub cascades: Vec<ChainSpec>,
}

impl PortalConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, String> {
        toml::from_str(source).map_err(|error| error.to_string())
    }

    pub fn cascade(&self, name: &str) -> Option<&ChainSpec> {
        self.cascades.iter().find(|chain| chain.name == name)
    }
}

// AppSection versions the embedded/page configuration so older page overrides
// can be detected and replaced by the built-in defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSection {
    pub version: String,
}

impl AppSection {
    /// Current configuration format version
    pub const CURRENT_VERSION: &'static str = "1.0.0";

    pub fn is_supported_version(&self) -> bool {
        matches!(self.version.as_str(), "1.0.0")
    }

    pub fn needs_migration(&self) -> bool {
        self.version != Self::CURRENT_VERSION
    }

    pub fn migration_strategy(&self) -> MigrationStrategy {
        match self.version.as_str() {
            "1.0.0" => MigrationStrategy::None,
            _ => MigrationStrategy::Recreate,
        }
    }
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MigrationStrategy {
    None,            // No migration needed
    Upgrade(String), // Automatic upgrade with description
    Recreate,        // Unknown version, fall back to built-in config
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PollingSection {
    pub pending_counts_url: String,
    pub notifications_url: String,
    pub notifications_read_url: String,
    pub notifications_read_all_url: String,
    pub notifications_limit: u32,
    pub interval_ms: u32,
    pub min_refresh_gap_ms: u32,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            pending_counts_url: "/hrmis/api/pending_counts".to_string(),
            notifications_url: "/hrmis/api/notifications".to_string(),
            notifications_read_url: "/hrmis/api/notifications/read".to_string(),
            notifications_read_all_url: "/hrmis/api/notifications/read_all".to_string(),
            notifications_limit: 20,
            interval_ms: 20_000,
            min_refresh_gap_ms: 8_000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LeaveFormSection {
    pub approvers_url: String,
}

impl Default for LeaveFormSection {
    fn default() -> Self {
        Self {
            approvers_url: "/hrmis/api/leave/approvers".to_string(),
        }
    }
}

/// Declarative description of one dependent-selector chain.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChainSpec {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NodeSpec {
    /// CSS selector of the `<select>` element.
    pub selector: String,
    /// Selector of the upstream node, `None` for the chain root.
    #[serde(default)]
    pub parent: Option<String>,
    /// Option attribute compared against the parent's selected value.
    #[serde(default)]
    pub match_attribute: Option<String>,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub criteria: Vec<InputCriterion>,
    #[serde(default)]
    pub unique_by_label: bool,
    /// Hidden options are also disabled (some embedded browsers ignore `display: none` on options).
    #[serde(default)]
    pub disable_hidden: bool,
    /// A missing optional node ends the chain instead of disabling it.
    #[serde(default)]
    pub optional: bool,
    /// Element receiving inline notices; defaults to a sibling of the selector.
    #[serde(default)]
    pub notice_target: Option<String>,
    #[serde(default)]
    pub source: OptionSource,
}

impl NodeSpec {
    pub fn remote(&self) -> Option<&RemoteSource> {
        match &self.source {
            OptionSource::Static => None,
            OptionSource::Remote(remote) => Some(remote),
        }
    }

    /// Input selectors whose edits should recompute this node.
    pub fn watched_inputs(&self) -> Vec<&str> {
        let mut inputs: Vec<&str> = self
            .criteria
            .iter()
            .map(|criterion| criterion.input.as_str())
            .collect();
        if let Some(remote) = self.remote() {
            for param in &remote.params {
                if let ParamSource::Input { selector } = &param.source {
                    inputs.push(selector.as_str());
                }
            }
        }
        let mut seen = std::collections::HashSet::new();
        inputs.retain(|input| seen.insert(*input));
        inputs
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Options without the attribute stay visible; an empty parent shows everything.
    #[default]
    Lenient,
    /// An empty parent shows everything; otherwise the attribute must match.
    Strict,
    /// Nothing but the placeholder until the parent has a value.
    RequireParent,
}

/// Extra text/number input participating in a node's filter.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct InputCriterion {
    pub input: String,
    /// Option attribute that must equal the trimmed input value (empty input = no constraint).
    #[serde(default)]
    pub attribute: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionSource {
    #[default]
    Static,
    Remote(RemoteSource),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RemoteSource {
    pub endpoint: String,
    #[serde(default)]
    pub params: Vec<QueryParam>,
    #[serde(default = "default_items_field")]
    pub items_field: String,
    /// JSON item field -> option attribute key.
    #[serde(default)]
    pub attribute_fields: IndexMap<String, String>,
    /// Top-level payload field -> attribute copied onto every option.
    #[serde(default)]
    pub payload_attributes: IndexMap<String, String>,
    #[serde(default)]
    pub label_template: Option<String>,
    /// Info notice rendered from the payload after a successful load.
    #[serde(default)]
    pub summary_template: Option<String>,
    /// Replaces the generic failure message.
    #[serde(default)]
    pub failure_message: Option<String>,
}

fn default_items_field() -> String {
    "items".to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QueryParam {
    pub name: String,
    pub source: ParamSource,
    /// An empty required value skips the fetch entirely.
    #[serde(default)]
    pub required: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum ParamSource {
    Parent,
    Input { selector: String },
    DataAttribute { selector: String, attribute: String },
    Literal { value: String },
}

// ===== UTILITY FUNCTIONS =====

/// Text form of a JSON value as stored in a `data-*` attribute.
pub fn attribute_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Fills `{key}` and `{key|fallback}` placeholders. Missing or empty values
/// use the fallback (or nothing); an unterminated `{` is copied verbatim.
pub fn render_template(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let after_open = &rest[start + 1..];
        let Some(end) = after_open.find('}') else {
            rendered.push_str(&rest[start..]);
            return rendered;
        };
        let token = &after_open[..end];
        let (key, fallback) = match token.split_once('|') {
            Some((key, fallback)) => (key.trim(), fallback),
            None => (token.trim(), ""),
        };
        match lookup(key).filter(|value| !value.is_empty()) {
            Some(value) => rendered.push_str(&value),
            None => rendered.push_str(fallback),
        }
        rest = &after_open[end + 1..];
    }
    rendered.push_str(rest);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_payload_reads_configured_items_field() {
        let payload: LookupPayload = serde_json::from_value(json!({
            "ok": true,
            "leave_types": [
                { "id": 7, "name": "Casual", "support_document": false },
                { "id": "9", "name": "Medical", "support_document": true }
            ]
        }))
        .unwrap();

        let items = payload.items("leave_types").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id_text(), "7");
        assert_eq!(items[1].id_text(), "9");
        assert_eq!(items[1].field_text("support_document").as_deref(), Some("1"));
        assert!(payload.items("items").unwrap().is_empty());
    }

    #[test]
    fn lookup_payload_rejects_non_array_items() {
        let payload: LookupPayload =
            serde_json::from_value(json!({ "ok": true, "items": "nope" })).unwrap();
        assert!(payload.items("items").is_err());
    }

    #[test]
    fn missing_ok_flag_reads_as_not_ok() {
        let payload: LookupPayload =
            serde_json::from_value(json!({ "error": "not_allowed", "items": [] })).unwrap();
        assert!(!payload.ok);
        assert_eq!(payload.error.as_deref(), Some("not_allowed"));
    }

    #[test]
    fn template_substitutes_fields_and_fallbacks() {
        let lookup = |key: &str| match key {
            "name" => Some("DHQ Lahore".to_string()),
            "vacant" => Some("3".to_string()),
            "blank" => Some(String::new()),
            _ => None,
        };
        assert_eq!(
            render_template("{name} (Vacant: {vacant})", lookup),
            "DHQ Lahore (Vacant: 3)"
        );
        assert_eq!(
            render_template("with {designation|your designation} at {blank|BPS ?}", lookup),
            "with your designation at BPS ?"
        );
        assert_eq!(render_template("open { brace", lookup), "open { brace");
    }

    #[test]
    fn attribute_text_matches_dataset_conventions() {
        assert_eq!(attribute_text(&json!(true)), "1");
        assert_eq!(attribute_text(&json!(false)), "0");
        assert_eq!(attribute_text(&json!(null)), "");
        assert_eq!(attribute_text(&json!(17)), "17");
        assert_eq!(attribute_text(&json!("x")), "x");
    }

    #[test]
    fn watched_inputs_cover_criteria_and_input_params() {
        let node = NodeSpec {
            selector: ".js-hrmis-leave-type".to_string(),
            criteria: vec![InputCriterion {
                input: ".js-hrmis-bps".to_string(),
                attribute: Some("bps".to_string()),
            }],
            source: OptionSource::Remote(RemoteSource {
                endpoint: "/hrmis/api/leave/types".to_string(),
                params: vec![
                    QueryParam {
                        name: "date_from".to_string(),
                        source: ParamSource::Input {
                            selector: ".js-hrmis-date-from".to_string(),
                        },
                        required: false,
                    },
                    QueryParam {
                        name: "bps".to_string(),
                        source: ParamSource::Input {
                            selector: ".js-hrmis-bps".to_string(),
                        },
                        required: false,
                    },
                ],
                items_field: "leave_types".to_string(),
                attribute_fields: IndexMap::new(),
                payload_attributes: IndexMap::new(),
                label_template: None,
                summary_template: None,
                failure_message: None,
            }),
            ..NodeSpec::default()
        };
        assert_eq!(
            node.watched_inputs(),
            vec![".js-hrmis-bps", ".js-hrmis-date-from"]
        );
    }

    #[test]
    fn chain_spec_parses_from_toml() {
        let config = PortalConfig::from_toml_str(
            r##"
            [app]
            version = "1.0.0"

            [[cascades]]
            name = "demo"

            [[cascades.nodes]]
            selector = "#district"

            [[cascades.nodes]]
            selector = "#facility"
            parent = "#district"
            match_attribute = "districtId"
            match_mode = "strict"

            [cascades.nodes.source]
            kind = "remote"
            endpoint = "/api/facilities"
            params = [{ name = "district_id", source = { from = "parent" }, required = true }]
            "##,
        )
        .unwrap();

        let chain = config.cascade("demo").unwrap();
        assert_eq!(chain.nodes.len(), 2);
        assert_eq!(chain.nodes[1].match_mode, MatchMode::Strict);
        let remote = chain.nodes[1].remote().unwrap();
        assert_eq!(remote.items_field, "items");
        assert_eq!(remote.params[0].source, ParamSource::Parent);
        assert!(remote.params[0].required);
        assert_eq!(config.polling.interval_ms, 20_000);
        assert!(!config.app.needs_migration());
    }

    #[test]
    fn approver_bps_range_is_inclusive() {
        let payload: ApproversPayload = serde_json::from_value(json!({
            "ok": true,
            "steps": [{
                "step": 1,
                "approvers": [
                    { "name": "DHO", "sequence": 1, "bps_from": 1, "bps_to": 16 },
                    { "name": "MS", "sequence": 2 }
                ]
            }]
        }))
        .unwrap();
        let approvers = &payload.steps[0].approvers;
        assert!(approvers[0].covers_bps(16));
        assert!(!approvers[0].covers_bps(17));
        assert!(approvers[1].covers_bps(0));
        assert!(approvers[1].covers_bps(22));
    }

    #[test]
    fn unknown_version_requests_recreate() {
        let section = AppSection {
            version: "0.3.0".to_string(),
        };
        assert!(!section.is_supported_version());
        assert_eq!(section.migration_strategy(), MigrationStrategy::Recreate);
    }
}
