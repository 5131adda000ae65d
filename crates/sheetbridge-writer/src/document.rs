//! Document builder: owns the sheets and compiles the execution plan

use std::collections::HashSet;

use tracing::debug;

use crate::error::{Result, WriterError};
use crate::plan::{Plan, Task};
use crate::sheet::{Sheet, SheetName};
use crate::style::SheetOptions;

/// A set of sheets to replay into the remote document.
///
/// ```
/// use sheetbridge_writer::Document;
///
/// let mut doc = Document::new();
/// doc.active().row().cell("on the active sheet", None);
/// doc.sheet("Totals").row().number(12.5, None);
/// let plan = doc.build().unwrap();
/// assert_eq!(plan.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Document {
    options: SheetOptions,
    sheets: Vec<Sheet>,
    current: Option<usize>,
}

impl Document {
    /// Create a document with default sheet options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document whose sheets start from `options`
    pub fn with_options(options: SheetOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    /// Hide grid lines on every sheet
    pub fn without_grid_lines(&mut self) -> &mut Self {
        self.options.show_grid_lines = false;
        self
    }

    /// Sheets in declaration order
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Look up a sheet by its current name
    pub fn get(&self, name: &str) -> Option<&Sheet> {
        self.position(&SheetName::Named(name.to_string()))
            .map(|i| &self.sheets[i])
    }

    /// The most recently selected sheet
    pub fn current(&mut self) -> Option<&mut Sheet> {
        match self.current {
            Some(index) => self.sheets.get_mut(index),
            None => None,
        }
    }

    fn position(&self, name: &SheetName) -> Option<usize> {
        self.sheets.iter().position(|sheet| match name {
            SheetName::Active => sheet.origin() == &SheetName::Active,
            SheetName::Named(_) => sheet.name() == name,
        })
    }

    /// Index of the sheet, creating it when missing; new sheets start cleared
    fn select(&mut self, name: SheetName) -> (usize, bool) {
        let (index, created) = match self.position(&name) {
            Some(index) => (index, false),
            None => {
                let mut sheet = Sheet::new(name, self.options.clone());
                sheet.clear();
                self.sheets.push(sheet);
                (self.sheets.len() - 1, true)
            }
        };
        self.current = Some(index);
        (index, created)
    }

    /// The sheet that is active when the plan runs
    pub fn active(&mut self) -> &mut Sheet {
        let (index, _) = self.select(SheetName::Active);
        &mut self.sheets[index]
    }

    /// Get or create a named sheet
    pub fn sheet(&mut self, name: &str) -> &mut Sheet {
        let (index, _) = self.select(SheetName::Named(name.to_string()));
        &mut self.sheets[index]
    }

    /// Get or create a named sheet, restarting an existing one from a clear range
    pub fn new_sheet(&mut self, name: &str) -> &mut Sheet {
        let (index, created) = self.select(SheetName::Named(name.to_string()));
        let sheet = &mut self.sheets[index];
        if !created {
            sheet.clear();
        }
        sheet
    }

    /// Rename a sheet. `from` defaults to the most recently selected sheet.
    ///
    /// Fails without emitting anything when another sheet already uses `name`.
    pub fn rename(&mut self, name: &str, from: Option<&str>) -> Result<&mut Sheet> {
        let index = match from {
            Some(from) => self
                .position(&SheetName::Named(from.to_string()))
                .ok_or_else(|| WriterError::SheetNotFound(from.to_string()))?,
            None => self.current.ok_or(WriterError::NoSheetSelected)?,
        };

        let taken = self
            .sheets
            .iter()
            .enumerate()
            .any(|(i, sheet)| i != index && sheet.name().as_named() == Some(name));
        if taken {
            return Err(WriterError::DuplicateSheetName(name.to_string()));
        }

        self.current = Some(index);
        let sheet = &mut self.sheets[index];
        sheet.rename(name);
        Ok(sheet)
    }

    /// Finish every sheet and compile the plan.
    ///
    /// The plan holds one task per sheet, resolving or creating it and
    /// appending its name, then one task replaying every sheet in
    /// declaration order.
    pub fn build(&mut self) -> Result<Plan> {
        for sheet in &mut self.sheets {
            sheet.end();
        }
        self.check_unique_names()?;

        let mut tasks: Vec<Task> = self
            .sheets
            .iter()
            .map(|sheet| match sheet.origin() {
                SheetName::Active => Task::active_sheet(),
                SheetName::Named(name) => Task::ensure_sheet(name),
            })
            .collect();

        let bodies: Vec<String> = self
            .sheets
            .iter()
            .map(|sheet| sheet.build(self.options.show_grid_lines))
            .collect();
        tasks.push(Task::replay(&bodies));

        debug!(sheets = self.sheets.len(), tasks = tasks.len(), "compiled document plan");
        Ok(Plan::new(tasks))
    }

    /// Both the names sheets are created under and their final names must be
    /// unique, or two sheets would replay onto the same remote sheet
    fn check_unique_names(&self) -> Result<()> {
        let mut origins = HashSet::new();
        let mut names = HashSet::new();
        for sheet in &self.sheets {
            if let Some(origin) = sheet.origin().as_named() {
                if !origins.insert(origin) {
                    return Err(WriterError::DuplicateSheetName(origin.to_string()));
                }
            }
            if let Some(name) = sheet.name().as_named() {
                if !names.insert(name) {
                    return Err(WriterError::DuplicateSheetName(name.to_string()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::TaskKind;
    use crate::style::BorderToEnd;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_produces_n_plus_two_tasks() {
        let mut doc = Document::new();
        doc.sheet("A").row().cell("a", None);
        doc.active().row().cell("active", None);
        doc.sheet("B").row().cell("b", None);
        doc.sheet("C");

        let plan = doc.build().unwrap();
        assert_eq!(plan.len(), 3 + 2);

        let kinds: Vec<&TaskKind> = plan.iter().map(|t| t.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                &TaskKind::EnsureSheet("A".to_string()),
                &TaskKind::ActiveSheet,
                &TaskKind::EnsureSheet("B".to_string()),
                &TaskKind::EnsureSheet("C".to_string()),
                &TaskKind::Replay { sheets: 4 },
            ]
        );

        let replay = plan.tasks()[4].body();
        let a = replay.find("SetValue(\"a\")").unwrap();
        let active = replay.find("SetValue(\"active\")").unwrap();
        let b = replay.find("SetValue(\"b\")").unwrap();
        assert!(a < active && active < b);
        assert!(replay.contains("Api.GetSheet(args[3])"));
    }

    #[test]
    fn test_active_is_idempotent() {
        let mut doc = Document::new();
        doc.active().row().cell(1, None);
        doc.sheet("X");
        doc.active().cell(2, None);
        assert_eq!(doc.sheets().len(), 2);
        assert_eq!(doc.sheets()[0].col_index(), 1);
    }

    #[test]
    fn test_sheet_is_get_or_create() {
        let mut doc = Document::new();
        doc.sheet("A").row().cell("x", None);
        let count = doc.sheet("A").instructions().len();
        assert_eq!(doc.sheets().len(), 1);
        assert_eq!(doc.get("A").unwrap().instructions().len(), count);
        assert_eq!(
            doc.get("A").unwrap().instructions()[0].as_str(),
            "sheet.GetUsedRange().Clear()"
        );

        doc.new_sheet("A");
        let sheet = doc.get("A").unwrap();
        assert_eq!(sheet.row_index(), -1);
        assert_eq!(sheet.instructions().len(), count + 1);
    }

    #[test]
    fn test_rename_conflict_emits_nothing() {
        let mut doc = Document::new();
        doc.sheet("A");
        doc.sheet("B").row().cell("b", None);
        let before = doc.get("B").unwrap().instructions().to_vec();

        let err = doc.rename("A", Some("B")).unwrap_err();
        assert_eq!(err, WriterError::DuplicateSheetName("A".to_string()));
        assert_eq!(doc.get("B").unwrap().instructions(), before.as_slice());
    }

    #[test]
    fn test_rename_current_sheet() {
        let mut doc = Document::new();
        doc.sheet("A");
        doc.sheet("B");
        doc.rename("C", None).unwrap();
        assert!(doc.get("B").is_none());
        let sheet = doc.get("C").unwrap();
        assert_eq!(sheet.origin(), &SheetName::Named("B".to_string()));

        // the remote sheet is still created as B, then renamed during replay
        let plan = doc.build().unwrap();
        assert_eq!(plan.tasks()[1].kind(), &TaskKind::EnsureSheet("B".to_string()));
        assert!(plan.tasks()[2].body().contains("sheet.SetName(\"C\")"));
    }

    #[test]
    fn test_rename_unknown_sheet() {
        let mut doc = Document::new();
        assert_eq!(
            doc.rename("A", None).unwrap_err(),
            WriterError::NoSheetSelected
        );
        assert_eq!(
            doc.rename("A", Some("missing")).unwrap_err(),
            WriterError::SheetNotFound("missing".to_string())
        );
    }

    #[test]
    fn test_build_rejects_recreated_origin() {
        let mut doc = Document::new();
        doc.sheet("A");
        doc.rename("Z", None).unwrap();
        doc.sheet("A");
        assert_eq!(
            doc.build().unwrap_err(),
            WriterError::DuplicateSheetName("A".to_string())
        );
    }

    #[test]
    fn test_document_options_flow_into_sheets() {
        let mut doc = Document::with_options(SheetOptions {
            border_to_end: Some(BorderToEnd::default()),
            ..SheetOptions::default()
        });
        doc.without_grid_lines();
        doc.active().row().cell("x", None).cell("y", None);

        let plan = doc.build().unwrap();
        let replay = plan.tasks()[1].body();
        assert!(replay.contains("fillBorder(sheet,0,0,0,1,"));
        assert!(replay.contains("sheet.SetDisplayGridlines(false)"));
    }

    #[test]
    fn test_build_twice_is_stable() {
        let mut doc = Document::with_options(SheetOptions {
            border_to_end: Some(BorderToEnd::default()),
            ..SheetOptions::default()
        });
        doc.sheet("Data").row().cell("x", None);

        let first = doc.build().unwrap();
        let second = doc.build().unwrap();
        assert_eq!(first.tasks()[1].body(), second.tasks()[1].body());
        assert_eq!(second.tasks()[1].body().matches("fillBorder(sheet,0,0,").count(), 1);
    }
}
