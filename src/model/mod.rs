//! The report model: columns, filter parameters and the report itself.

pub mod column;
pub mod operator_value;
pub mod parameter_definition;
pub mod query_parameter;
pub mod report;
pub mod types;

pub use column::{Column, ColumnAttributes, ColumnOptions, FingerprintError};
pub use operator_value::{Operator, OperatorValue};
pub use parameter_definition::{
    ListDef, ListOption, ListResolver, ParameterDefinitionHash, QueryParameterDefinition,
    ResolvedList,
};
pub use query_parameter::QueryParameter;
pub use report::{ColumnMatch, Report, ReportHash};
pub use types::{ControlType, DataType, Value};
