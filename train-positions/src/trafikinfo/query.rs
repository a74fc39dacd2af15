//! Query construction and XML serialization.
//!
//! Trafikinfo queries are small XML documents: a login element carrying the
//! authentication key, and a query element naming the object type, its
//! filters, and the fields to include in the reply. The shape of the query
//! is configuration ([`QueryConfig`]); [`QueryDescriptor`] is the validated,
//! immutable value built from it for one invocation.

use std::fmt;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// XML declaration written ahead of every serialized query.
pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

const DATEADD_PREFIX: &str = "$dateadd(";

/// Stand-in for the authentication key in logged queries.
const REDACTED_KEY: &str = "***";

/// Errors building, serializing or reading back a query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Query configuration violates a constraint
    #[error("invalid query: {0}")]
    Invalid(String),

    /// Relative-time expression could not be parsed
    #[error("invalid relative time expression {0:?}")]
    InvalidRelativeTime(String),

    /// XML serialization failed
    #[error("XML serialization failed: {0}")]
    Serialize(#[from] quick_xml::se::SeError),

    /// XML document could not be read back
    #[error("XML parse error: {0}")]
    Deserialize(#[from] quick_xml::de::DeError),
}

/// A time offset relative to the moment the service evaluates the query.
///
/// Rendered in the service's `$dateadd([-]D.HH:MM:SS)` syntax.
///
/// # Examples
///
/// ```
/// use train_positions::trafikinfo::RelativeTime;
///
/// let fifteen_ago = RelativeTime::minutes_ago(15);
/// assert_eq!(fifteen_ago.to_string(), "$dateadd(-0.00:15:00)");
/// assert_eq!(RelativeTime::parse("$dateadd(-0.00:15:00)").unwrap(), fifteen_ago);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeTime {
    offset: TimeDelta,
}

impl RelativeTime {
    /// Offset from now; negative values point into the past.
    pub fn new(offset: TimeDelta) -> Self {
        // Sub-second precision is not expressible on the wire
        Self {
            offset: TimeDelta::seconds(offset.num_seconds()),
        }
    }

    pub fn minutes_ago(minutes: i64) -> Self {
        Self::new(-TimeDelta::minutes(minutes))
    }

    pub fn offset(&self) -> TimeDelta {
        self.offset
    }

    /// Parse a `$dateadd(...)` expression. The day component is optional.
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        let invalid = || QueryError::InvalidRelativeTime(s.to_string());

        let body = s
            .trim()
            .strip_prefix(DATEADD_PREFIX)
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(invalid)?;

        let (negative, body) = match body.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, body),
        };

        let (days, clock) = match body.split_once('.') {
            Some((d, c)) => (d.parse::<i64>().map_err(|_| invalid())?, c),
            None => (0, body),
        };

        let mut fields = clock.split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(invalid());
        };
        let parse_field = |f: &str, max: i64| -> Result<i64, QueryError> {
            match f.parse::<i64>() {
                Ok(v) if f.len() == 2 && (0..max).contains(&v) => Ok(v),
                _ => Err(invalid()),
            }
        };
        let (h, m, sec) = (parse_field(h, 24)?, parse_field(m, 60)?, parse_field(sec, 60)?);
        if days < 0 {
            return Err(invalid());
        }

        let total = days
            .checked_mul(86_400)
            .and_then(|d| d.checked_add((h * 60 + m) * 60 + sec))
            .ok_or_else(invalid)?;
        let total = if negative { -total } else { total };
        let offset = TimeDelta::try_seconds(total).ok_or_else(invalid)?;
        Ok(Self::new(offset))
    }
}

impl fmt::Display for RelativeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.offset.num_seconds();
        let sign = if secs < 0 { "-" } else { "" };
        let secs = secs.unsigned_abs();
        write!(
            f,
            "{DATEADD_PREFIX}{sign}{}.{:02}:{:02}:{:02})",
            secs / 86_400,
            (secs / 3_600) % 24,
            (secs / 60) % 60,
            secs % 60
        )
    }
}

/// The right-hand side of a filter clause.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum FilterValue {
    Literal(String),
    Relative(RelativeTime),
}

impl FilterValue {
    /// Interpret a raw attribute value. `$dateadd(...)` becomes a relative time.
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        if s.trim_start().starts_with(DATEADD_PREFIX) {
            RelativeTime::parse(s).map(FilterValue::Relative)
        } else {
            Ok(FilterValue::Literal(s.to_string()))
        }
    }
}

impl TryFrom<String> for FilterValue {
    type Error = QueryError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        FilterValue::parse(&s)
    }
}

/// Classifies like [`FilterValue::parse`]. A malformed `$dateadd(...)` is
/// kept as a literal here and rejected when a [`QueryDescriptor`] is built.
impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::parse(s).unwrap_or_else(|_| FilterValue::Literal(s.to_string()))
    }
}

impl From<RelativeTime> for FilterValue {
    fn from(t: RelativeTime) -> Self {
        FilterValue::Relative(t)
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Literal(s) => f.write_str(s),
            FilterValue::Relative(t) => t.fmt(f),
        }
    }
}

/// Comparison operators understood by the service.
///
/// Declaration order is the order clauses appear in a serialized filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// One filter clause: `field <op> value`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Filter {
    pub op: FilterOp,
    pub field: String,
    pub value: FilterValue,
}

impl Filter {
    pub fn new(op: FilterOp, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            op,
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Shape of the query sent to the service.
///
/// Defaults reproduce the standard "active trains, fastest first" query.
/// Loaded from JSON when a query file is configured; missing keys fall back
/// to the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub namespace: String,
    pub object_type: String,
    pub schema_version: String,
    /// Maximum number of objects returned
    pub limit: u32,
    /// Ordering clause, e.g. `"Speed desc"`
    pub order_by: Option<String>,
    pub filters: Vec<Filter>,
    /// Fields to project, in order
    pub include: Vec<String>,
}

impl QueryConfig {
    /// Check the constraints a descriptor relies on.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.limit == 0 {
            return Err(QueryError::Invalid("limit must be positive".into()));
        }
        if self.namespace.trim().is_empty() {
            return Err(QueryError::Invalid("namespace is empty".into()));
        }
        if self.object_type.trim().is_empty() {
            return Err(QueryError::Invalid("object type is empty".into()));
        }
        if self.schema_version.trim().is_empty() {
            return Err(QueryError::Invalid("schema version is empty".into()));
        }
        if let Some(f) = self.filters.iter().find(|f| f.field.trim().is_empty()) {
            return Err(QueryError::Invalid(format!(
                "{:?} filter has an empty field name",
                f.op
            )));
        }
        if self.include.iter().any(|i| i.trim().is_empty()) {
            return Err(QueryError::Invalid("include list has an empty entry".into()));
        }
        Ok(())
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            namespace: "järnväg.trafikinfo".to_string(),
            object_type: "TrainPosition".to_string(),
            schema_version: "1.0".to_string(),
            limit: 25,
            order_by: Some("Speed desc".to_string()),
            filters: vec![
                Filter::new(FilterOp::Eq, "Status.Active", "true"),
                Filter::new(FilterOp::Gt, "ModifiedTime", RelativeTime::minutes_ago(15)),
            ],
            include: [
                "Train.AdvertisedTrainNumber",
                "Position.WGS84",
                "Bearing",
                "Speed",
                "TimeStamp",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// A complete, validated request for one invocation.
///
/// Immutable once built; filters are held in wire order.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    authentication_key: String,
    namespace: String,
    object_type: String,
    schema_version: String,
    limit: u32,
    order_by: Option<String>,
    filters: Vec<Filter>,
    include: Vec<String>,
}

impl QueryDescriptor {
    /// Build a descriptor from a key and a query shape.
    pub fn new(
        authentication_key: impl Into<String>,
        config: &QueryConfig,
    ) -> Result<Self, QueryError> {
        config.validate()?;

        // Literals that read as `$dateadd(...)` are held as relative times
        let mut filters = config
            .filters
            .iter()
            .map(|f| -> Result<Filter, QueryError> {
                let value = match &f.value {
                    FilterValue::Literal(s) => FilterValue::parse(s)?,
                    relative => relative.clone(),
                };
                Ok(Filter { value, ..f.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        filters.sort_by_key(|f| f.op);

        Ok(Self {
            authentication_key: authentication_key.into(),
            namespace: config.namespace.clone(),
            object_type: config.object_type.clone(),
            schema_version: config.schema_version.clone(),
            limit: config.limit,
            order_by: config.order_by.clone(),
            filters,
            include: config.include.clone(),
        })
    }

    pub fn authentication_key(&self) -> &str {
        &self.authentication_key
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn order_by(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    /// Serialize to the indented XML document the service expects.
    pub fn to_xml(&self) -> Result<String, QueryError> {
        let doc = RequestDoc::from(self);

        let mut body = String::new();
        let mut ser = quick_xml::se::Serializer::new(&mut body);
        ser.indent(' ', 4);
        doc.serialize(ser)?;

        Ok(format!("{XML_HEADER}{body}"))
    }

    /// Serialize as [`to_xml`](Self::to_xml) does, with the authentication
    /// key replaced, for logging.
    pub fn to_redacted_xml(&self) -> Result<String, QueryError> {
        Self {
            authentication_key: REDACTED_KEY.to_string(),
            ..self.clone()
        }
        .to_xml()
    }

    /// Read a serialized query back into a descriptor.
    pub fn from_xml(xml: &str) -> Result<Self, QueryError> {
        let doc: RequestDoc = quick_xml::de::from_str(xml)?;
        let q = doc.query;

        let f = q.filter;
        let clauses = [
            (FilterOp::Eq, f.eq),
            (FilterOp::Ne, f.ne),
            (FilterOp::Gt, f.gt),
            (FilterOp::Gte, f.gte),
            (FilterOp::Lt, f.lt),
            (FilterOp::Lte, f.lte),
        ];
        let mut filters = Vec::new();
        for (op, docs) in clauses {
            for c in docs {
                filters.push(Filter {
                    op,
                    field: c.name,
                    value: FilterValue::parse(&c.value)?,
                });
            }
        }

        let config = QueryConfig {
            namespace: q.namespace,
            object_type: q.object_type,
            schema_version: q.schema_version,
            limit: q.limit,
            order_by: q.order_by,
            filters,
            include: q.include,
        };
        Self::new(doc.login.authentication_key, &config)
    }
}

// Wire documents. Field names prefixed with '@' are XML attributes.

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "request")]
struct RequestDoc {
    login: LoginDoc,
    query: QueryDoc,
}

#[derive(Debug, Serialize, Deserialize)]
struct LoginDoc {
    #[serde(rename = "@authenticationkey")]
    authentication_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct QueryDoc {
    #[serde(rename = "@namespace")]
    namespace: String,
    #[serde(rename = "@objecttype")]
    object_type: String,
    #[serde(rename = "@schemaversion")]
    schema_version: String,
    #[serde(rename = "@limit")]
    limit: u32,
    #[serde(rename = "@orderby", default, skip_serializing_if = "Option::is_none")]
    order_by: Option<String>,
    #[serde(default, skip_serializing_if = "FilterDoc::is_empty")]
    filter: FilterDoc,
    #[serde(default)]
    include: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FilterDoc {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    eq: Vec<ClauseDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ne: Vec<ClauseDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    gt: Vec<ClauseDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    gte: Vec<ClauseDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    lt: Vec<ClauseDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    lte: Vec<ClauseDoc>,
}

impl FilterDoc {
    fn is_empty(&self) -> bool {
        self.eq.is_empty()
            && self.ne.is_empty()
            && self.gt.is_empty()
            && self.gte.is_empty()
            && self.lt.is_empty()
            && self.lte.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ClauseDoc {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@value")]
    value: String,
}

impl From<&QueryDescriptor> for RequestDoc {
    fn from(d: &QueryDescriptor) -> Self {
        let mut filter = FilterDoc::default();
        for f in &d.filters {
            let clause = ClauseDoc {
                name: f.field.clone(),
                value: f.value.to_string(),
            };
            let slot = match f.op {
                FilterOp::Eq => &mut filter.eq,
                FilterOp::Ne => &mut filter.ne,
                FilterOp::Gt => &mut filter.gt,
                FilterOp::Gte => &mut filter.gte,
                FilterOp::Lt => &mut filter.lt,
                FilterOp::Lte => &mut filter.lte,
            };
            slot.push(clause);
        }

        RequestDoc {
            login: LoginDoc {
                authentication_key: d.authentication_key.clone(),
            },
            query: QueryDoc {
                namespace: d.namespace.clone(),
                object_type: d.object_type.clone(),
                schema_version: d.schema_version.clone(),
                limit: d.limit,
                order_by: d.order_by.clone(),
                filter,
                include: d.include.clone(),
            },
        }
    }
}
