use serde::{Deserialize, Serialize};

use crate::contract::model::{LicenseRecord, UserRecord};

/// Paged collection envelope.
#[derive(Debug, Deserialize)]
pub struct GraphCollection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
    #[serde(rename = "@odata.count")]
    pub count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedSku {
    pub sku_id: String,
    pub sku_part_number: String,
    #[serde(default)]
    pub consumed_units: u32,
    #[serde(default)]
    pub prepaid_units: PrepaidUnits,
}

#[derive(Debug, Default, Deserialize)]
pub struct PrepaidUnits {
    #[serde(default)]
    pub enabled: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphUser {
    pub id: String,
    pub display_name: Option<String>,
    pub user_principal_name: Option<String>,
    #[serde(default)]
    pub assigned_licenses: Vec<AssignedLicense>,
    pub usage_location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedLicense {
    pub sku_id: Option<String>,
}

/// Body of `POST /users/{id}/assignLicense`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignLicenseBody {
    pub add_licenses: Vec<AddLicense>,
    pub remove_licenses: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLicense {
    pub sku_id: String,
    pub disabled_plans: Vec<String>,
}

impl AssignLicenseBody {
    /// Swap one SKU for another in a single call.
    pub fn swap(remove_sku: &str, add_sku: &str) -> Self {
        Self {
            add_licenses: vec![AddLicense {
                sku_id: add_sku.to_string(),
                disabled_plans: Vec::new(),
            }],
            remove_licenses: vec![remove_sku.to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl From<SubscribedSku> for LicenseRecord {
    fn from(sku: SubscribedSku) -> Self {
        Self {
            sku_id: sku.sku_id,
            sku_name: sku.sku_part_number,
            total_units: sku.prepaid_units.enabled,
            consumed_units: sku.consumed_units,
        }
    }
}

impl From<GraphUser> for UserRecord {
    fn from(u: GraphUser) -> Self {
        Self {
            id: u.id,
            display_name: u.display_name.unwrap_or_default(),
            principal_name: u.user_principal_name.unwrap_or_default(),
            assigned_license_ids: u
                .assigned_licenses
                .into_iter()
                .filter_map(|l| l.sku_id)
                .collect(),
            usage_location: u.usage_location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_subscribed_sku() {
        let sku: SubscribedSku = serde_json::from_value(json!({
            "skuId": "6fd2c87f-b296-42f0-b197-1e91e994b900",
            "skuPartNumber": "ENTERPRISEPACK",
            "consumedUnits": 40,
            "prepaidUnits": { "enabled": 100, "suspended": 0, "warning": 0 },
            "capabilityStatus": "Enabled"
        }))
        .unwrap();
        let rec = LicenseRecord::from(sku);
        assert_eq!(rec.sku_name, "ENTERPRISEPACK");
        assert_eq!(rec.total_units, 100);
        assert_eq!(rec.available_units(), 60);
    }

    #[test]
    fn maps_user_with_missing_fields() {
        let page: GraphCollection<GraphUser> = serde_json::from_value(json!({
            "@odata.count": 1,
            "value": [{
                "id": "u1",
                "displayName": null,
                "userPrincipalName": "ada@contoso.com",
                "assignedLicenses": [
                    { "skuId": "a", "disabledPlans": [] },
                    { "skuId": null, "disabledPlans": [] }
                ]
            }]
        }))
        .unwrap();
        assert_eq!(page.count, Some(1));
        assert!(page.next_link.is_none());

        let user = UserRecord::from(page.value.into_iter().next().unwrap());
        assert_eq!(user.display_name, "");
        assert_eq!(user.assigned_license_ids, vec!["a".to_string()]);
        assert!(user.usage_location.is_none());
    }

    #[test]
    fn assign_body_shape() {
        let body = serde_json::to_value(AssignLicenseBody::swap("old", "new")).unwrap();
        assert_eq!(
            body,
            json!({
                "addLicenses": [{ "skuId": "new", "disabledPlans": [] }],
                "removeLicenses": ["old"]
            })
        );
    }
}
