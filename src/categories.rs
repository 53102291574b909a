//! Category tree aggregation.
//!
//! The server reports, per category, only the assets filed directly under it.
//! Clients want subtree totals, so the freshly fetched tree is folded
//! bottom-up once before it is handed out.
//!
//! The fold is not idempotent: aggregating an already aggregated tree counts
//! every descendant again. Run it exactly once per fetched tree.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One node of the category tree
///
/// Fields other than the count and the children are kept verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    /// Number of assets in this category
    #[serde(default)]
    pub asset_count: i64,
    /// Sub-categories, in server order
    #[serde(default)]
    pub children: Vec<CategoryNode>,
    /// Remaining server fields (name, slug, description, …)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Return a new tree where every count includes all descendants
pub fn aggregate(roots: &[CategoryNode]) -> Vec<CategoryNode> {
    roots.iter().map(aggregate_node).collect()
}

fn aggregate_node(node: &CategoryNode) -> CategoryNode {
    let children: Vec<CategoryNode> = node.children.iter().map(aggregate_node).collect();
    let asset_count = node.asset_count + children.iter().map(|c| c.asset_count).sum::<i64>();

    CategoryNode {
        asset_count,
        children,
        extra: node.extra.clone(),
    }
}

/// Pull the category list out of a `/categories/` response body
pub fn parse_response(body: serde_json::Value) -> Result<Vec<CategoryNode>> {
    let serde_json::Value::Object(mut body) = body else {
        return Err(Error::UnexpectedResponse(
            "categories response is not an object".to_string(),
        ));
    };
    let results = body
        .remove("results")
        .ok_or_else(|| Error::UnexpectedResponse("categories response has no results".into()))?;
    Ok(serde_json::from_value(results)?)
}
