//! One-hot encoding of the categorical claim fields.
//!
//! The vocabulary is fitted on the records at hand, so the set of indicator
//! columns depends on the input batch. Within a batch it is deterministic:
//! fields keep a fixed order and values are sorted, and each column is named
//! `<FIELD>_<value>`.

use crate::error::{FeatureError, Result};
use serde::{Deserialize, Serialize};
use sinistro_clean::CleanedRecord;
use sinistro_clean::schema::{CAUSE, EVENT, MODALITY, PRODUCT_TYPE, REGION, SEX};
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};

/// Number of categorical fields.
pub const FIELD_COUNT: usize = 6;

/// A categorical field of the cleaned table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoricalField {
    /// `EVENTO`
    Event,
    /// `CAUSA`
    Cause,
    /// `MODALIDADE`
    Modality,
    /// `TIPO_PROD`
    ProductType,
    /// `REGIAO`
    Region,
    /// `SEXO`
    Sex,
}

impl CategoricalField {
    /// All categorical fields in encoding order.
    pub const fn all() -> [Self; FIELD_COUNT] {
        [
            Self::Event,
            Self::Cause,
            Self::Modality,
            Self::ProductType,
            Self::Region,
            Self::Sex,
        ]
    }

    /// Source column name.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Event => EVENT,
            Self::Cause => CAUSE,
            Self::Modality => MODALITY,
            Self::ProductType => PRODUCT_TYPE,
            Self::Region => REGION,
            Self::Sex => SEX,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }

    /// The record's value for this field, in string form.
    pub fn value_of<'a>(&self, record: &'a CleanedRecord) -> Cow<'a, str> {
        match self {
            Self::Event => Cow::Owned(record.event.to_string()),
            Self::Cause => Cow::Owned(record.cause.to_string()),
            Self::Modality => Cow::Borrowed(&record.modality),
            Self::ProductType => Cow::Borrowed(&record.product_type),
            Self::Region => Cow::Owned(record.region.to_string()),
            Self::Sex => Cow::Borrowed(record.sex.as_str()),
        }
    }
}

/// Generate the indicator column name for a category value.
fn indicator_column_name(field: CategoricalField, value: &str) -> String {
    format!("{}_{}", field.column(), value)
}

/// One binary feature: presence of `value` in `field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorColumn {
    /// Source field
    pub field: CategoricalField,
    /// Category value
    pub value: String,
}

impl IndicatorColumn {
    /// Column name, `<FIELD>_<value>`.
    pub fn name(&self) -> String {
        indicator_column_name(self.field, &self.value)
    }
}

/// A cleaned record with categories replaced by indicator positions and
/// monetary fields reduced to magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedRecord {
    /// Occurrence date, still unvalidated
    pub occurrence_date: String,
    /// Absolute indemnity
    pub indemnity: f64,
    /// Absolute salvage value
    pub salvage: f64,
    /// Absolute recovery value
    pub recovery: f64,
    /// Position of the single hot indicator of each field, in field order
    pub hot: [usize; FIELD_COUNT],
}

impl EncodedRecord {
    /// Dense indicator row of the given width.
    pub fn indicators(&self, width: usize) -> Vec<u8> {
        (0..width).map(|c| u8::from(self.hot.contains(&c))).collect()
    }
}

/// Fitted mapping from category value to indicator column.
#[derive(Debug, Clone, Default)]
pub struct OneHotEncoder {
    columns: Vec<IndicatorColumn>,
    lookup: [HashMap<String, usize>; FIELD_COUNT],
}

impl OneHotEncoder {
    /// Fit the vocabulary on the observed values of every categorical field.
    pub fn fit(records: &[CleanedRecord]) -> Self {
        let mut vocabulary: [BTreeSet<String>; FIELD_COUNT] = Default::default();
        for record in records {
            for field in CategoricalField::all() {
                let values = &mut vocabulary[field.index()];
                let value = field.value_of(record);
                if !values.contains(value.as_ref()) {
                    values.insert(value.into_owned());
                }
            }
        }

        let mut encoder = Self::default();
        for field in CategoricalField::all() {
            for value in std::mem::take(&mut vocabulary[field.index()]) {
                encoder.lookup[field.index()].insert(value.clone(), encoder.columns.len());
                encoder.columns.push(IndicatorColumn { field, value });
            }
        }
        encoder
    }

    /// Indicator columns in output order.
    pub fn columns(&self) -> &[IndicatorColumn] {
        &self.columns
    }

    /// Indicator column names in output order.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns.iter().map(IndicatorColumn::name).collect()
    }

    /// Number of indicator columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no column was fitted.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column position of a category value.
    pub fn position(&self, field: CategoricalField, value: &str) -> Option<usize> {
        self.lookup[field.index()].get(value).copied()
    }

    /// Encode records. Monetary fields become absolute values.
    pub fn transform(&self, records: &[CleanedRecord]) -> Result<Vec<EncodedRecord>> {
        records
            .iter()
            .map(|record| -> Result<EncodedRecord> {
                let mut hot = [0; FIELD_COUNT];
                for (slot, field) in hot.iter_mut().zip(CategoricalField::all()) {
                    let value = field.value_of(record);
                    *slot = self.position(field, &value).ok_or_else(|| {
                        FeatureError::UnknownCategory {
                            column: field.column(),
                            value: value.into_owned(),
                        }
                    })?;
                }

                Ok(EncodedRecord {
                    occurrence_date: record.occurrence_date.clone(),
                    indemnity: record.indemnity.abs(),
                    salvage: record.salvage.abs(),
                    recovery: record.recovery.abs(),
                    hot,
                })
            })
            .collect()
    }
}

/// Fit an encoder on `records` and encode them.
pub fn fit_transform(records: &[CleanedRecord]) -> Result<(OneHotEncoder, Vec<EncodedRecord>)> {
    let encoder = OneHotEncoder::fit(records);
    let encoded = encoder.transform(records)?;
    Ok((encoder, encoded))
}
