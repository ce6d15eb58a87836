#![allow(dead_code)]

use std::sync::Arc;

use cribro::solver::{
    predicate::SharedPredicate,
    predicates::AllDistinct,
    scope::{FamilyId, Scope},
};

/// A known-valid solved 9×9 grid to derive puzzles from.
pub const SOLVED_9: [[u8; 9]; 9] = [
    [5, 3, 4, 6, 7, 8, 9, 1, 2],
    [6, 7, 2, 1, 9, 5, 3, 4, 8],
    [1, 9, 8, 3, 4, 2, 5, 6, 7],
    [8, 5, 9, 7, 6, 1, 4, 2, 3],
    [4, 2, 6, 8, 5, 3, 7, 9, 1],
    [7, 1, 3, 9, 2, 4, 8, 5, 6],
    [9, 6, 1, 5, 3, 7, 2, 8, 4],
    [2, 8, 7, 4, 1, 9, 6, 3, 5],
    [3, 4, 5, 2, 8, 6, 1, 7, 9],
];

/// A known-valid solved 4×4 grid (2×2 boxes).
pub const SOLVED_4: [[u8; 4]; 4] = [
    [1, 2, 3, 4],
    [3, 4, 1, 2],
    [2, 1, 4, 3],
    [4, 3, 2, 1],
];

/// Row, column and box all-distinct constraints for a square grid with
/// `box_side`² cells per side, registered once per possible root position.
/// Families: rows `0..size`, columns `size..2*size`, boxes `2*size..3*size`.
pub fn grid_constraints(box_side: usize) -> Vec<(Scope, SharedPredicate<u8>)> {
    let size = box_side * box_side;
    let cell = |row: usize, col: usize| row * size + col;
    let all_distinct: SharedPredicate<u8> = Arc::new(AllDistinct);

    let mut constraints = Vec::new();
    let mut register = |variables: Vec<usize>, family: u32, label: String| {
        let mut scope = Scope::new(variables, FamilyId(family)).with_label(label);
        for _ in 0..size {
            constraints.push((scope.clone(), all_distinct.clone()));
            scope = scope.rotated();
        }
    };

    for i in 0..size {
        register(
            (0..size).map(|col| cell(i, col)).collect(),
            i as u32,
            format!("row {i}"),
        );
        register(
            (0..size).map(|row| cell(row, i)).collect(),
            (size + i) as u32,
            format!("column {i}"),
        );
        let top_row = (i / box_side) * box_side;
        let top_col = (i % box_side) * box_side;
        register(
            (0..size)
                .map(|j| cell(top_row + j / box_side, top_col + j % box_side))
                .collect(),
            (2 * size + i) as u32,
            format!("box {i}"),
        );
    }

    constraints
}

/// Initial domains for a grid: full `1..=size` for blank (zero) cells, a
/// singleton for givens.
pub fn grid_domains(grid: &[Vec<u8>]) -> Vec<Vec<u8>> {
    let size = grid.len();
    let mut domains = Vec::with_capacity(size * size);
    for row in grid {
        for &value in row {
            domains.push(if value == 0 {
                (1..=size as u8).collect()
            } else {
                vec![value]
            });
        }
    }
    domains
}

pub fn rows_of<const N: usize>(grid: &[[u8; N]; N]) -> Vec<Vec<u8>> {
    grid.iter().map(|row| row.to_vec()).collect()
}
