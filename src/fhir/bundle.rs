use serde::Serialize;

/// One search hit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry<R> {
    pub full_url: String,
    pub resource: R,
}

/// FHIR Bundle of type `searchset`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle<R> {
    pub resource_type: &'static str,
    #[serde(rename = "type")]
    pub bundle_type: &'static str,
    pub total: i64,
    pub entry: Vec<BundleEntry<R>>,
}

impl<R> Bundle<R> {
    /// Builds a searchset bundle
    ///
    /// `total` is the size of the whole match set, not of `entries`.
    pub fn searchset(total: i64, entries: impl IntoIterator<Item = BundleEntry<R>>) -> Self {
        Self {
            resource_type: "Bundle",
            bundle_type: "searchset",
            total,
            entry: entries.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn searchset_shape() {
        let bundle = Bundle::searchset(
            3,
            vec![BundleEntry {
                full_url: "/Patient/abc".to_string(),
                resource: json!({ "resourceType": "Patient", "id": "abc" }),
            }],
        );

        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["resourceType"], "Bundle");
        assert_eq!(value["type"], "searchset");
        assert_eq!(value["total"], 3);
        assert_eq!(value["entry"][0]["fullUrl"], "/Patient/abc");
        assert_eq!(value["entry"][0]["resource"]["id"], "abc");
    }

    #[test]
    fn empty_searchset_keeps_entry_array() {
        let bundle: Bundle<serde_json::Value> = Bundle::searchset(0, Vec::new());
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["entry"], json!([]));
    }
}
