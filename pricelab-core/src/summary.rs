//! Summary Assembler — the sole boundary handed to presentation code.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateRow;
use crate::demand::DemandModel;
use crate::domain::GroupLabel;

/// One exported row: a partition's rollup plus its demand model, when one
/// exists. Absence of a model means "not available", never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub aggregate: AggregateRow,
    pub model: Option<DemandModel>,
}

/// Left join of aggregate rows against fitted models by partition label.
///
/// Every aggregate row appears in exactly one summary row; unmatched rows keep
/// `model = None`. The aggregator's ordering is preserved.
pub fn assemble(
    aggregate_rows: Vec<AggregateRow>,
    models: &[(GroupLabel, DemandModel)],
) -> Vec<SummaryRow> {
    let by_label: HashMap<&GroupLabel, &DemandModel> =
        models.iter().map(|(label, model)| (label, model)).collect();

    aggregate_rows
        .into_iter()
        .map(|row| {
            let model = by_label.get(&row.label).map(|m| (*m).clone());
            SummaryRow {
                aggregate: row,
                model,
            }
        })
        .collect()
}
