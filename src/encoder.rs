use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{ArtifactLoadError, PipelineError, PipelineResult};
use crate::features::{EncodedRecord, FeatureRecord, FeatureValue, Record, CATEGORICAL_COLUMNS};

/// Code used for any value the training data never contained.
pub const UNSEEN_CODE: i64 = -1;

const ARTIFACT: &str = "label encoders";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Known(i64),
    Unseen,
}

impl Lookup {
    pub fn code(self) -> i64 {
        match self {
            Lookup::Known(c) => c,
            Lookup::Unseen => UNSEEN_CODE,
        }
    }
}

/// Known values of one categorical field. A value's code is its index in the fitted classes.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    codes: HashMap<String, i64>,
}

impl Vocabulary {
    pub fn from_classes<I, S>(classes: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut codes = HashMap::new();
        for (i, c) in classes.into_iter().enumerate() {
            let c = c.into();
            if codes.insert(c.clone(), i as i64).is_some() {
                return Err(format!("duplicate class `{c}`"));
            }
        }
        Ok(Self { codes })
    }

    pub fn lookup(&self, value: &str) -> Lookup {
        match self.codes.get(value) {
            Some(&c) => Lookup::Known(c),
            None => Lookup::Unseen,
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(transparent)]
struct EncodersJson(HashMap<String, Vec<String>>);

/// One vocabulary per categorical column; columns never share a vocabulary.
#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    vocabularies: HashMap<&'static str, Vocabulary>,
}

impl CategoricalEncoder {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ArtifactLoadError> {
        let EncodersJson(mut raw) = serde_json::from_slice(bytes)
            .map_err(|source| ArtifactLoadError::Decode { artifact: ARTIFACT, source })?;

        let mut vocabularies = HashMap::with_capacity(CATEGORICAL_COLUMNS.len());
        for col in CATEGORICAL_COLUMNS {
            let classes = raw
                .remove(col)
                .ok_or_else(|| ArtifactLoadError::invalid(ARTIFACT, format!("no encoder for `{col}`")))?;
            let vocab = Vocabulary::from_classes(classes)
                .map_err(|e| ArtifactLoadError::invalid(ARTIFACT, format!("`{col}`: {e}")))?;
            vocabularies.insert(col, vocab);
        }
        if !raw.is_empty() {
            let mut extra: Vec<_> = raw.into_keys().collect();
            extra.sort();
            tracing::warn!("ignoring encoders for non-categorical columns: {:?}", extra);
        }
        Ok(Self { vocabularies })
    }

    pub fn vocabulary(&self, column: &str) -> Option<&Vocabulary> {
        self.vocabularies.get(column)
    }

    /// Replaces every categorical value with its code, or `UNSEEN_CODE` when unknown.
    /// Also returns the columns that fell back to the sentinel.
    pub fn encode(&self, record: FeatureRecord) -> PipelineResult<(EncodedRecord, Vec<&'static str>)> {
        let mut values = Vec::with_capacity(record.values.len());
        let mut unseen = Vec::new();

        for (col, v) in record.columns.iter().zip(record.values) {
            match v {
                FeatureValue::Number(x) => values.push(x),
                FeatureValue::Category(s) => {
                    let vocab = self.vocabularies.get(col).ok_or_else(|| {
                        PipelineError::Failure(format!("no vocabulary for categorical column `{col}`"))
                    })?;
                    let hit = vocab.lookup(&s);
                    if hit == Lookup::Unseen {
                        tracing::debug!(column = %col, value = %s, "unseen category, using sentinel code");
                        unseen.push(*col);
                    }
                    values.push(hit.code() as f64);
                }
            }
        }

        Ok((Record::new(record.columns, values), unseen))
    }
}
