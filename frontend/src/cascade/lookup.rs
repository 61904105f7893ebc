use super::error::LookupError;
use serde_json::Value;
use shared::{LookupPayload, RemoteSource, SelectOption, render_template};

/// One GET against a lookup endpoint. Parameters keep their configured order.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupRequest {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
}

impl LookupRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Fetches raw JSON bodies for remote selector nodes.
///
/// Implementations only report transport problems (`Network`, `Status`,
/// `Malformed` for bodies that are not JSON); the `ok` flag and the items
/// array are interpreted by [`options_from_payload`].
pub trait OptionLookup {
    async fn fetch(&self, request: LookupRequest) -> Result<Value, LookupError>;
}

/// Options built from a successful lookup, together with the payload they
/// came from (summary notices read its top-level fields).
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedOptions {
    pub options: Vec<SelectOption>,
    pub payload: LookupPayload,
}

impl LoadedOptions {
    pub fn summary(&self, template: &str) -> String {
        render_template(template, |key| self.payload.field_text(key))
    }
}

/// Turns a lookup body into the full option set, `placeholder` first.
pub fn options_from_payload(
    remote: &RemoteSource,
    placeholder: &SelectOption,
    body: Value,
) -> Result<LoadedOptions, LookupError> {
    let payload: LookupPayload = serde_json::from_value(body)
        .map_err(|error| LookupError::Malformed(error.to_string()))?;
    if !payload.ok {
        return Err(LookupError::Rejected(
            payload.error.clone().unwrap_or_default(),
        ));
    }
    let items = payload
        .items(&remote.items_field)
        .map_err(LookupError::Malformed)?;

    let shared_attributes: Vec<(String, String)> = remote
        .payload_attributes
        .iter()
        .filter_map(|(field, attribute)| {
            payload
                .field_text(field)
                .map(|text| (attribute.clone(), text))
        })
        .collect();

    let mut options = Vec::with_capacity(items.len() + 1);
    options.push(placeholder.clone());
    for item in &items {
        let label = match &remote.label_template {
            Some(template) => render_template(template, |key| item.field_text(key)),
            None => item.name.clone(),
        };
        let mut option = SelectOption::new(item.id_text(), label);
        for (field, attribute) in &remote.attribute_fields {
            if let Some(text) = item.field_text(field) {
                option = option.with_attribute(attribute.clone(), text);
            }
        }
        for (attribute, text) in &shared_attributes {
            option = option.with_attribute(attribute.clone(), text.clone());
        }
        options.push(option);
    }

    Ok(LoadedOptions { options, payload })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn facilities_source() -> RemoteSource {
        RemoteSource {
            endpoint: "/hrmis/api/transfer/eligible_destinations".to_string(),
            params: Vec::new(),
            items_field: "facilities".to_string(),
            attribute_fields: IndexMap::from([
                ("district_id".to_string(), "districtId".to_string()),
                ("vacant".to_string(), "vacant".to_string()),
            ]),
            payload_attributes: IndexMap::from([(
                "employee_bps".to_string(),
                "employeeBps".to_string(),
            )]),
            label_template: Some("{name} (Vacant: {vacant})".to_string()),
            summary_template: Some(
                "Showing districts/facilities with {employee_designation|your designation} at BPS {employee_bps}."
                    .to_string(),
            ),
            failure_message: None,
        }
    }

    #[test]
    fn items_become_labelled_options_after_placeholder() {
        let loaded = options_from_payload(
            &facilities_source(),
            &SelectOption::placeholder("Select facility"),
            json!({
                "ok": true,
                "employee_bps": 17,
                "facilities": [
                    { "id": 4, "name": "RHC Kot", "district_id": 2, "vacant": 1 },
                    { "id": 9, "name": "THQ Pind", "district_id": 2, "vacant": 0 }
                ]
            }),
        )
        .unwrap();

        assert_eq!(loaded.options.len(), 3);
        assert_eq!(loaded.options[0].label, "Select facility");
        assert_eq!(loaded.options[1].value, "4");
        assert_eq!(loaded.options[1].label, "RHC Kot (Vacant: 1)");
        assert_eq!(loaded.options[2].attribute("districtId"), "2");
        assert_eq!(loaded.options[2].attribute("employeeBps"), "17");
        assert_eq!(
            loaded.summary(facilities_source().summary_template.as_deref().unwrap()),
            "Showing districts/facilities with your designation at BPS 17."
        );
    }

    #[test]
    fn not_ok_payload_is_rejected_with_server_code() {
        let result = options_from_payload(
            &facilities_source(),
            &SelectOption::placeholder(""),
            json!({ "ok": false, "error": "missing_employee_id" }),
        );
        assert_eq!(
            result,
            Err(LookupError::Rejected("missing_employee_id".to_string()))
        );
    }

    #[test]
    fn non_object_body_is_malformed() {
        let result = options_from_payload(
            &facilities_source(),
            &SelectOption::placeholder(""),
            json!(["not", "an", "envelope"]),
        );
        assert!(matches!(result, Err(LookupError::Malformed(_))));
    }
}
