use crate::ast::{EvaluationOutcome, Evaluator};
use crate::catalog::Catalog;
use crate::error::SheetError;
use crate::suggest::{self, SuggestOption};
use log::info;
use rayon::prelude::*;
use std::sync::{Arc, Mutex};

mod lock;

pub use lock::{toggle_lock, LockTask};

pub type SharedSheet = Arc<Mutex<FormulaSheet>>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RowId(u64);

/// One formula being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaRow {
    id: RowId,
    formula: Vec<String>,
    draft: String,
    locked: bool,
    loading: bool,
}

impl FormulaRow {
    fn new(id: RowId) -> Self {
        Self {
            id,
            formula: Vec::new(),
            draft: String::new(),
            locked: false,
            loading: false,
        }
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn formula(&self) -> &[String] {
        &self.formula
    }

    /// The token currently being typed.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// A lock toggle is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Tokens joined by single spaces.
    pub fn display(&self) -> String {
        self.formula.join(" ")
    }
}

/// Headless model of the formula editor: an ordered list of rows.
#[derive(Debug, Clone)]
pub struct FormulaSheet {
    rows: Vec<FormulaRow>,
    next_id: u64,
}

impl Default for FormulaSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaSheet {
    /// A sheet always starts with one empty row.
    pub fn new() -> Self {
        let mut sheet = Self {
            rows: Vec::new(),
            next_id: 0,
        };
        sheet.add_row();
        sheet
    }

    pub fn into_shared(self) -> SharedSheet {
        Arc::new(Mutex::new(self))
    }

    pub fn add_row(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(FormulaRow::new(id));
        info!("New formula (row {})", self.rows.len() - 1);
        id
    }

    pub fn delete_row(&mut self, index: usize) -> Result<FormulaRow, SheetError> {
        self.row(index)?;
        info!("Deleting formula row {}", index);
        Ok(self.rows.remove(index))
    }

    pub fn row(&self, index: usize) -> Result<&FormulaRow, SheetError> {
        self.rows.get(index).ok_or(SheetError::RowOutOfRange(index))
    }

    pub fn rows(&self) -> &[FormulaRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    pub fn set_formula(&mut self, index: usize, tokens: Vec<String>) -> Result<(), SheetError> {
        self.editable_row(index)?.formula = tokens;
        Ok(())
    }

    /// Appends a token and clears the draft it was typed into.
    pub fn push_token(&mut self, index: usize, token: impl Into<String>) -> Result<(), SheetError> {
        let row = self.editable_row(index)?;
        row.formula.push(token.into());
        row.draft.clear();
        Ok(())
    }

    pub fn set_draft(&mut self, index: usize, text: impl Into<String>) -> Result<(), SheetError> {
        self.editable_row(index)?.draft = text.into();
        Ok(())
    }

    pub fn display(&self, index: usize) -> Result<String, SheetError> {
        Ok(self.row(index)?.display())
    }

    /// Autocomplete options for the row's draft.
    pub fn options(&self, index: usize, catalog: &Catalog) -> Result<Vec<SuggestOption>, SheetError> {
        Ok(suggest::options(&self.row(index)?.draft, catalog))
    }

    pub fn evaluate(
        &self,
        index: usize,
        evaluator: &Evaluator,
        catalog: &Catalog,
    ) -> Result<EvaluationOutcome, SheetError> {
        Ok(evaluator.evaluate(&self.row(index)?.formula, catalog))
    }

    /// Evaluates every row against the same catalog snapshot, in row order.
    pub fn evaluate_all(&self, evaluator: &Evaluator, catalog: &Catalog) -> Vec<EvaluationOutcome> {
        self.rows
            .par_iter()
            .map(|row| evaluator.evaluate(&row.formula, catalog))
            .collect()
    }

    fn editable_row(&mut self, index: usize) -> Result<&mut FormulaRow, SheetError> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or(SheetError::RowOutOfRange(index))?;
        if row.locked {
            return Err(SheetError::RowLocked(index));
        }
        Ok(row)
    }

    pub(crate) fn row_by_id_mut(&mut self, id: RowId) -> Option<&mut FormulaRow> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    pub(crate) fn row_mut(&mut self, index: usize) -> Result<&mut FormulaRow, SheetError> {
        self.rows
            .get_mut(index)
            .ok_or(SheetError::RowOutOfRange(index))
    }
}

/// Text shown in a row's result cell.
pub fn render_outcome(outcome: &EvaluationOutcome) -> String {
    match outcome {
        EvaluationOutcome::Empty => String::new(),
        EvaluationOutcome::Value(value) => value.to_string(),
        EvaluationOutcome::Error(err) => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Suggestion;
    use crate::error::EvalError;

    fn tokens(formula: &str) -> Vec<String> {
        formula.split_whitespace().map(str::to_string).collect()
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Suggestion::new("1", "price", 120.0),
            Suggestion::new("2", "qty", 3.0),
        ])
    }

    #[test]
    fn test_new_sheet_has_one_empty_row() {
        let sheet = FormulaSheet::new();
        assert_eq!(sheet.len(), 1);
        assert!(sheet.row(0).unwrap().formula().is_empty());
        assert_eq!(sheet.display(0).unwrap(), "");
    }

    #[test]
    fn test_rows_get_distinct_ids() {
        let mut sheet = FormulaSheet::new();
        let second = sheet.add_row();
        let third = sheet.add_row();
        assert_ne!(second, third);
        assert_eq!(sheet.position(third), Some(2));

        sheet.delete_row(1).unwrap();
        assert_eq!(sheet.position(second), None);
        assert_eq!(sheet.position(third), Some(1));
        assert_eq!(sheet.delete_row(5), Err(SheetError::RowOutOfRange(5)));
    }

    #[test]
    fn test_editing_and_display() {
        let mut sheet = FormulaSheet::new();
        sheet.set_draft(0, "pr").unwrap();
        assert_eq!(sheet.row(0).unwrap().draft(), "pr");

        sheet.push_token(0, "price").unwrap();
        sheet.push_token(0, "*").unwrap();
        sheet.push_token(0, "qty").unwrap();
        assert_eq!(sheet.row(0).unwrap().draft(), "");
        assert_eq!(sheet.display(0).unwrap(), "price * qty");

        sheet.set_formula(0, tokens("1 + 1")).unwrap();
        assert_eq!(sheet.display(0).unwrap(), "1 + 1");
        assert_eq!(sheet.set_draft(3, "x"), Err(SheetError::RowOutOfRange(3)));
    }

    #[test]
    fn test_locked_row_rejects_edits() {
        let mut sheet = FormulaSheet::new();
        sheet.set_formula(0, tokens("price")).unwrap();
        sheet.row_mut(0).unwrap().locked = true;

        assert_eq!(sheet.push_token(0, "+"), Err(SheetError::RowLocked(0)));
        assert_eq!(sheet.set_formula(0, vec![]), Err(SheetError::RowLocked(0)));
        assert_eq!(sheet.set_draft(0, "q"), Err(SheetError::RowLocked(0)));
        assert_eq!(sheet.display(0).unwrap(), "price");
    }

    #[test]
    fn test_options_follow_draft() {
        let mut sheet = FormulaSheet::new();
        sheet.set_draft(0, "q").unwrap();
        let options = sheet.options(0, &catalog()).unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].value, "qty");
    }

    #[test]
    fn test_evaluate_all_keeps_row_order_and_isolates_failures() {
        let mut sheet = FormulaSheet::new();
        sheet.set_formula(0, tokens("price * qty")).unwrap();
        sheet.add_row();
        sheet.set_formula(1, tokens("price / 0")).unwrap();
        sheet.add_row();
        sheet.add_row();
        sheet.set_formula(3, tokens("( qty + 1 ) ^ 2")).unwrap();

        let evaluator = Evaluator::default();
        let catalog = catalog();
        let outcomes = sheet.evaluate_all(&evaluator, &catalog);

        assert_eq!(
            outcomes,
            vec![
                EvaluationOutcome::Value(360.0),
                EvaluationOutcome::Error(EvalError::DivisionByZero),
                EvaluationOutcome::Empty,
                EvaluationOutcome::Value(16.0),
            ]
        );
        for (index, outcome) in outcomes.iter().enumerate() {
            assert_eq!(&sheet.evaluate(index, &evaluator, &catalog).unwrap(), outcome);
        }
    }

    #[test]
    fn test_render_outcome() {
        assert_eq!(render_outcome(&EvaluationOutcome::Empty), "");
        assert_eq!(render_outcome(&EvaluationOutcome::Value(14.0)), "14");
        assert_eq!(render_outcome(&EvaluationOutcome::Value(0.5)), "0.5");
        assert_eq!(
            render_outcome(&EvaluationOutcome::Error(EvalError::DivisionByZero)),
            "division by zero"
        );
    }
}
