use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use tabular::{Row, Table};

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SimplexError};
use crate::model::Model;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TableauIx {
    i: usize,
    j: usize,
}

impl TableauIx {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }

    pub fn i(&self) -> usize {
        self.i
    }

    pub fn j(&self) -> usize {
        self.j
    }
}

/// Dense simplex tableau of a canonical model.
///
/// Row 0 holds the negated objective coefficients with the current objective
/// value in the last column. Rows `1..=m` are the constraint rows with their
/// right hand side in the last column. Every variable of `model` owns one
/// column, in model order.
///
/// `basis[r]` is the column basic in constraint row `r + 1`; its column is a
/// unit vector over all rows, objective row included.
#[derive(Clone, Debug)]
pub struct Tableau {
    pub(crate) model: Arc<Model>,
    pub(crate) tbl: Array2<f64>,
    pub(crate) basis: Vec<Option<usize>>,
    pub(crate) tol: f64,
}

impl Tableau {
    /// Builds a tableau from a matrix with the objective in row 0, detecting
    /// the initial basis from the unit columns of the matrix.
    pub(crate) fn new(model: Arc<Model>, tbl: Array2<f64>, tol: f64) -> Self {
        let mut tableau = Self {
            model,
            tbl,
            basis: Vec::new(),
            tol,
        };
        tableau.basis = tableau.detect_basis();
        tableau
    }

    pub(crate) fn from_rows(
        model: Arc<Model>,
        objective_row: &[f64],
        rows: &[Vec<f64>],
        tol: f64,
    ) -> Self {
        let n = objective_row.len();
        let mut tbl = Array2::<f64>::zeros((rows.len() + 1, n));
        tbl.row_mut(0).assign(&ArrayView1::from(objective_row));
        for (i, row) in rows.iter().enumerate() {
            tbl.slice_mut(s![i + 1, ..row.len().min(n)])
                .assign(&ArrayView1::from(&row[..row.len().min(n)]));
        }
        Self::new(model, tbl, tol)
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn tbl(&self) -> &Array2<f64> {
        &self.tbl
    }

    pub fn basis(&self) -> &[Option<usize>] {
        &self.basis
    }

    fn rhs_col(&self) -> usize {
        self.tbl.ncols().saturating_sub(1)
    }

    pub fn n_constraints(&self) -> usize {
        self.tbl.nrows().saturating_sub(1)
    }

    pub fn objective_coefficients(&self) -> ArrayView1<f64> {
        self.tbl.slice(s![0, ..-1])
    }

    pub fn objective_value(&self) -> f64 {
        self.tbl[[0, self.rhs_col()]]
    }

    fn is_unit_column(&self, col: usize) -> Option<usize> {
        let mut one = None;
        for (i, &v) in self.tbl.column(col).iter().enumerate() {
            if (v - 1.0_f64).abs() <= self.tol && one.is_none() {
                one = Some(i);
            } else if v.abs() > self.tol {
                return None;
            }
        }
        one.filter(|&i| i > 0)
    }

    //augmented columns come last, so scanning backwards makes a row's slack
    //or artificial column basic ahead of an original unit column
    fn detect_basis(&self) -> Vec<Option<usize>> {
        let mut basis = vec![None; self.n_constraints()];
        for col in (0..self.rhs_col()).rev() {
            if let Some(row) = self.is_unit_column(col) {
                if basis[row - 1].is_none() {
                    basis[row - 1] = Some(col);
                }
            }
        }
        basis
    }

    /// Optimal once no objective coefficient is below `-tol`.
    pub fn is_optimal(&self) -> bool {
        self.objective_coefficients().iter().all(|&c| c >= -self.tol)
    }

    /// Column with the most negative objective coefficient, lowest index on
    /// ties.
    pub fn choose_entering_variable(&self) -> usize {
        let mut best = 0;
        for (j, &c) in self.objective_coefficients().iter().enumerate() {
            if c < self.tbl[[0, best]] {
                best = j;
            }
        }
        best
    }

    /// No constraint row limits growth along `col`.
    pub fn is_unbounded(&self, col: usize) -> bool {
        self.tbl.slice(s![1.., col]).iter().all(|&v| v <= self.tol)
    }

    /// Minimum ratio test over rows with a positive entry in `col`, lowest
    /// row on ties. Returns the tableau row (objective row is 0).
    pub fn choose_leaving_variable(&self, col: usize) -> Option<usize> {
        let rhs = self.rhs_col();
        let mut best: Option<(usize, f64)> = None;
        for i in 1..self.tbl.nrows() {
            let a = self.tbl[[i, col]];
            if a <= self.tol {
                continue;
            }
            let ratio = self.tbl[[i, rhs]] / a;
            match best {
                Some((_, r)) if ratio >= r => {}
                _ => best = Some((i, ratio)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Makes `pivot_ind.j()` basic in row `pivot_ind.i()`.
    ///
    /// The row must be a constraint row, the column a variable column and
    /// the pivot element larger than the tolerance in magnitude.
    pub fn pivot(&mut self, pivot_ind: &TableauIx) -> Result<()> {
        let (pi, pj) = (pivot_ind.i(), pivot_ind.j());
        if pi == 0 || pi >= self.tbl.nrows() || pj >= self.rhs_col() {
            return Err(SimplexError::InvalidPivot { row: pi, col: pj });
        }

        //normalize pivot row
        let div = self.tbl[[pi, pj]];
        if div.abs() <= self.tol {
            return Err(SimplexError::InvalidPivot { row: pi, col: pj });
        }
        let mut row_p = self.tbl.row_mut(pi);
        row_p /= div;
        row_p[pj] = 1.0_f64;
        let row_p = row_p.to_owned();

        //eliminate pivot column from every other row
        for (i, mut row) in self.tbl.rows_mut().into_iter().enumerate() {
            if i == pi {
                continue;
            }
            let ratio = row[pj];
            if ratio != 0.0_f64 {
                row.scaled_add(-ratio, &row_p);
            }
            row[pj] = 0.0_f64;
        }

        self.basis[pi - 1] = Some(pj);
        Ok(())
    }

    /// Values of every column variable; non basic variables are zero.
    pub fn extract_assignment(&self) -> Vec<f64> {
        let rhs = self.rhs_col();
        let mut assignment = vec![0.0_f64; rhs];
        for (r, col) in self.basis.iter().enumerate() {
            if let Some(col) = col {
                assignment[*col] = self.tbl[[r + 1, rhs]];
            }
        }
        assignment
    }

    /// Value of the variable basic in constraint row `row`.
    pub(crate) fn row_value(&self, row: usize) -> f64 {
        self.tbl[[row + 1, self.rhs_col()]]
    }

    /// Replaces the objective row and eliminates the current basic columns
    /// from it.
    pub(crate) fn set_objective_row(&mut self, objective_row: Array1<f64>) {
        self.tbl.row_mut(0).assign(&objective_row);
        for r in 0..self.basis.len() {
            let Some(col) = self.basis[r] else {
                continue;
            };
            let coeff = self.tbl[[0, col]];
            if coeff == 0.0_f64 {
                continue;
            }
            let row = self.tbl.row(r + 1).to_owned();
            let mut obj = self.tbl.row_mut(0);
            obj.scaled_add(-coeff, &row);
            obj[col] = 0.0_f64;
        }
    }

    /// Drops variable columns, switching to `model` whose variables are the
    /// remaining columns in order.
    pub(crate) fn remove_columns(&mut self, cols: &[usize], model: Arc<Model>) {
        let keep: Vec<usize> = (0..self.tbl.ncols()).filter(|j| !cols.contains(j)).collect();
        self.tbl = self.tbl.select(Axis(1), &keep);
        self.basis = self
            .basis
            .iter()
            .map(|col| col.and_then(|c| keep.iter().position(|&k| k == c)))
            .collect();
        self.model = model;
    }

    /// Drops constraint row `row` (0 based over constraint rows).
    pub(crate) fn remove_row(&mut self, row: usize) {
        let keep: Vec<usize> = (0..self.tbl.nrows()).filter(|&i| i != row + 1).collect();
        self.tbl = self.tbl.select(Axis(0), &keep);
        self.basis.remove(row);
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        //basis, objective, variables, rhs
        let vars = self.model.variables();
        let n_cols = vars.len().min(self.rhs_col());
        let columns = format!("{{:>}} | {{:>}}{} | {{:>}}", " | {:>}".repeat(n_cols));
        let mut table = Table::new(columns.as_str());

        let obj_name = self
            .model
            .objective()
            .map(|obj| obj.name())
            .unwrap_or("z");

        let mut header = Row::new().with_cell("basis").with_cell(obj_name);
        vars.iter().take(n_cols).for_each(|var| {
            header.add_cell(var.name());
        });
        header.add_cell("b");
        table.add_row(header);

        for (i, tbl_row) in self.tbl.rows().into_iter().enumerate() {
            let label = match i {
                0 => obj_name.to_string(),
                _ => self.basis[i - 1]
                    .and_then(|c| vars.get(c))
                    .map(|v| v.name().to_string())
                    .unwrap_or_else(|| "-".to_string()),
            };
            let obj_coeff = if i == 0 { 1.0_f64 } else { 0.0_f64 };
            let mut row = Row::new()
                .with_cell(label)
                .with_cell(format!("{:.3}", obj_coeff));
            tbl_row.iter().take(n_cols).for_each(|v| {
                row.add_cell(format!("{:.3}", v));
            });
            row.add_cell(format!("{:.3}", tbl_row[self.rhs_col()]));
            table.add_row(row);
        }

        write!(f, "{}", table)
    }
}
