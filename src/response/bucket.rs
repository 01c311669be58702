use crate::error::{FacetCheckError, Result};
use crate::settings::Settings;
use crate::types::{Bucket, Metric, MetricKind, NormalizeWarning};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Where a bucket sits in the response, for error messages and warnings.
pub(crate) struct BucketScope<'a> {
    pub facet: &'a str,
    pub settings: &'a Settings,
}

/// Stringify a JSON scalar label. Some fields (numeric, boolean) come back
/// with non-string labels.
pub(crate) fn scalar_label(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn parse_bucket(
    raw: &Value,
    index: usize,
    scope: &BucketScope<'_>,
    warnings: &mut Vec<NormalizeWarning>,
) -> Result<Bucket> {
    let obj = raw.as_object().ok_or_else(|| {
        FacetCheckError::MalformedJson(format!(
            "Bucket #{} of facet '{}' is not an object",
            index, scope.facet
        ))
    })?;

    let label = scalar_label(obj.get("label")).ok_or_else(|| {
        FacetCheckError::MalformedJson(format!(
            "Bucket #{} of facet '{}' has no label",
            index, scope.facet
        ))
    })?;

    let filter_query = obj
        .get("filterQuery")
        .and_then(Value::as_str)
        .filter(|fq| !fq.trim().is_empty())
        .ok_or_else(|| {
            FacetCheckError::MalformedJson(format!(
                "Bucket '{}' of facet '{}' has an empty filterQuery",
                label, scope.facet
            ))
        })?
        .to_string();

    let display = obj.get("display").filter(|d| !d.is_null()).cloned();

    let mut metrics = match obj.get("metrics") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|m| parse_metric(m, &label, scope, warnings))
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(FacetCheckError::MalformedJson(format!(
                "Bucket '{}' of facet '{}' has non-array metrics: {}",
                label, scope.facet, other
            )))
        }
    };

    if let Some(count) = bare_count(obj, &label, scope)? {
        match metrics.iter().find_map(Metric::count_value) {
            Some(metric_count) if metric_count != count => {
                return Err(FacetCheckError::MalformedJson(format!(
                    "Bucket '{}' of facet '{}' reports count {} but its count metric says {}",
                    label, scope.facet, count, metric_count
                )));
            }
            Some(_) => {}
            None => metrics.insert(0, Metric::count(count)),
        }
    }

    Ok(Bucket {
        label,
        filter_query,
        display,
        metrics,
    })
}

fn bare_count(obj: &Map<String, Value>, label: &str, scope: &BucketScope<'_>) -> Result<Option<u64>> {
    match obj.get("count") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_u64().map(Some).ok_or_else(|| {
            FacetCheckError::MalformedJson(format!(
                "Bucket '{}' of facet '{}' has a non-integer count: {}",
                label, scope.facet, v
            ))
        }),
    }
}

fn parse_metric(
    raw: &Value,
    bucket: &str,
    scope: &BucketScope<'_>,
    warnings: &mut Vec<NormalizeWarning>,
) -> Result<Metric> {
    let obj = raw.as_object().ok_or_else(|| {
        FacetCheckError::MalformedJson(format!(
            "Metric of bucket '{}' in facet '{}' is not an object",
            bucket, scope.facet
        ))
    })?;

    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .map(MetricKind::from)
        .ok_or_else(|| {
            FacetCheckError::MalformedJson(format!(
                "Metric of bucket '{}' in facet '{}' has no type",
                bucket, scope.facet
            ))
        })?;

    let value: IndexMap<String, Value> = match obj.get("value") {
        None | Some(Value::Null) => IndexMap::new(),
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        // Opaque scalar payloads of unknown metric types are kept under "value".
        Some(other) => std::iter::once(("value".to_string(), other.clone())).collect(),
    };

    let metric = Metric { kind, value };

    if metric.kind == MetricKind::Count && metric.count_value().is_none() {
        return Err(FacetCheckError::MalformedJson(format!(
            "Count metric of bucket '{}' in facet '{}' has no integer value.count",
            bucket, scope.facet
        )));
    }

    if !scope.settings.is_known_metric_type(metric.kind.as_str()) {
        tracing::warn!(
            "[NORMALIZE] unknown metric type '{}' on bucket '{}' of facet '{}', keeping it as-is",
            metric.kind,
            bucket,
            scope.facet
        );
        warnings.push(NormalizeWarning::UnknownMetricType {
            facet: scope.facet.to_string(),
            bucket: bucket.to_string(),
            metric_type: metric.kind.to_string(),
        });
    }

    Ok(metric)
}
