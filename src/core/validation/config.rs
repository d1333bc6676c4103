//! Per-field filter and validator pipelines

use crate::core::error::FieldValidationError;
use crate::core::field::ProposedFields;
use serde_json::Value;
use std::collections::BTreeSet;

type Filter = Box<dyn Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync>;
type Validator = Box<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

struct FieldPipeline {
    field: String,
    filters: Vec<Filter>,
    validators: Vec<Validator>,
}

/// Filters and validators for one mutation kind
///
/// For every configured field present in the input, filters run first (in
/// insertion order), then validators; the first failing validator is the
/// field's error. Required fields are checked against `null` when absent.
/// Fields without a pipeline are dropped from the output.
#[derive(Default)]
pub struct ValidationConfig {
    pipelines: Vec<FieldPipeline>,
    required: BTreeSet<String>,
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn pipeline(&mut self, field: &str) -> &mut FieldPipeline {
        let index = match self.pipelines.iter().position(|p| p.field == field) {
            Some(index) => index,
            None => {
                self.pipelines.push(FieldPipeline {
                    field: field.to_string(),
                    filters: Vec::new(),
                    validators: Vec::new(),
                });
                self.pipelines.len() - 1
            }
        };
        &mut self.pipelines[index]
    }

    pub fn add_filter<F>(&mut self, field: &str, filter: F)
    where
        F: Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.pipeline(field).filters.push(Box::new(filter));
    }

    pub fn add_validator<V>(&mut self, field: &str, validator: V)
    where
        V: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.pipeline(field).validators.push(Box::new(validator));
    }

    /// Mark a field as mandatory; pair with the `required()` validator
    pub fn require(&mut self, field: &str) {
        self.pipeline(field);
        self.required.insert(field.to_string());
    }

    pub fn validate_and_filter(
        &self,
        input: &ProposedFields,
    ) -> Result<ProposedFields, Vec<FieldValidationError>> {
        let mut output = ProposedFields::new();
        let mut errors = Vec::new();

        for pipeline in &self.pipelines {
            let field = pipeline.field.as_str();
            let value = match input.get(field) {
                Some(value) => value.clone(),
                None if self.required.contains(field) => Value::Null,
                None => continue,
            };

            match Self::run(pipeline, value) {
                Ok(value) => output.insert(field, value),
                Err(message) => errors.push(FieldValidationError::new(field, message)),
            }
        }

        if errors.is_empty() {
            Ok(output)
        } else {
            Err(errors)
        }
    }

    fn run(pipeline: &FieldPipeline, value: Value) -> Result<Value, String> {
        let field = pipeline.field.as_str();
        let mut value = value;
        for filter in &pipeline.filters {
            value = filter(field, value).map_err(|e| e.to_string())?;
        }
        for validator in &pipeline.validators {
            validator(field, &value)?;
        }
        Ok(value)
    }
}
