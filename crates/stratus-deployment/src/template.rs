//! Deployment template defaulting

/// Pick the deployment template for a region when none was given
///
/// `azure` is checked before `gcp`, so a region naming both resolves to the
/// azure template.
pub fn default_template(region: &str) -> &'static str {
    if region.contains("azure") {
        "azure-io-optimized"
    } else if region.contains("gcp") {
        "gcp-io-optimized"
    } else if region == "ece-region" {
        "default"
    } else {
        "aws-io-optimized-v2"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_table() {
        let cases = [
            ("us-east-1", "aws-io-optimized-v2"),
            ("azure-eastus", "azure-io-optimized"),
            ("gcp-us-central1", "gcp-io-optimized"),
            ("ece-region", "default"),
            ("unknown", "aws-io-optimized-v2"),
            ("", "aws-io-optimized-v2"),
        ];
        for (region, expected) in cases {
            assert_eq!(default_template(region), expected, "region {region}");
        }
    }

    #[test]
    fn test_azure_wins_over_gcp() {
        assert_eq!(default_template("gcp-azure-mixed"), "azure-io-optimized");
        assert_eq!(default_template("azure-gcp"), "azure-io-optimized");
    }

    #[test]
    fn test_ece_region_must_match_exactly() {
        assert_eq!(default_template("my-ece-region"), "aws-io-optimized-v2");
    }
}
