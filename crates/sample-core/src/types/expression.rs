//! Predicate and sort-key builders over entity fields.
//!
//! A [`Predicate`] is a small expression tree rather than a closure so the
//! same value can be evaluated against an entity in memory and pushed down
//! to SQL as a parameterized `WHERE` clause. Combining two predicates binds
//! both to the same entity instance; in SQL each operand's parameters are
//! renumbered into one shared list.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use crate::error::AppError;
use crate::result::AppResult;
use crate::traits::entity::{DELETED_AT, Entity};
use crate::types::value::FieldValue;

/// Untyped predicate expression. Field names always come from an entity's
/// declared field list.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Matches every row.
    Always,
    /// `field == value` (`IS NULL` when value is null).
    Eq {
        /// Field (column) name.
        field: &'static str,
        /// Value to compare against.
        value: FieldValue,
    },
    /// Both operands hold.
    And(Box<FilterExpr>, Box<FilterExpr>),
    /// Either operand holds.
    Or(Box<FilterExpr>, Box<FilterExpr>),
    /// The operand does not hold.
    Not(Box<FilterExpr>),
}

/// A parameterized SQL condition.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    /// Condition text with `?N` placeholders.
    pub sql: String,
    /// Parameter values, `params[0]` binds `?{first_index}`.
    pub params: Vec<FieldValue>,
}

impl FilterExpr {
    fn evaluate(&self, lookup: &dyn Fn(&str) -> Option<FieldValue>) -> bool {
        match self {
            Self::Always => true,
            Self::Eq { field, value } => lookup(field).is_some_and(|v| values_equal(&v, value)),
            Self::And(a, b) => a.evaluate(lookup) && b.evaluate(lookup),
            Self::Or(a, b) => a.evaluate(lookup) || b.evaluate(lookup),
            Self::Not(a) => !a.evaluate(lookup),
        }
    }

    fn render(&self, sql: &mut String, params: &mut Vec<FieldValue>, first_index: usize) {
        match self {
            Self::Always => sql.push_str("1 = 1"),
            Self::Eq { field, value } if value.is_null() => {
                sql.push_str(field);
                sql.push_str(" IS NULL");
            }
            Self::Eq { field, value } => {
                params.push(value.clone());
                let index = first_index + params.len() - 1;
                sql.push_str(&format!("{field} = ?{index}"));
            }
            Self::And(a, b) | Self::Or(a, b) => {
                let op = if matches!(self, Self::And(..)) { " AND " } else { " OR " };
                sql.push('(');
                a.render(sql, params, first_index);
                sql.push_str(op);
                b.render(sql, params, first_index);
                sql.push(')');
            }
            Self::Not(a) => {
                sql.push_str("NOT (");
                a.render(sql, params, first_index);
                sql.push(')');
            }
        }
    }
}

fn values_equal(left: &FieldValue, right: &FieldValue) -> bool {
    match (left, right) {
        (FieldValue::Integer(a), FieldValue::Float(b)) | (FieldValue::Float(b), FieldValue::Integer(a)) => {
            (*a as f64) == *b
        }
        _ => left == right,
    }
}

/// A predicate over entities of type `T`.
pub struct Predicate<T> {
    expr: FilterExpr,
    _entity: PhantomData<fn(&T) -> bool>,
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self::from_expr(self.expr.clone())
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.expr).finish()
    }
}

impl<T> Predicate<T> {
    fn from_expr(expr: FilterExpr) -> Self {
        Self {
            expr,
            _entity: PhantomData,
        }
    }

    /// A predicate matching every entity.
    pub fn always() -> Self {
        Self::from_expr(FilterExpr::Always)
    }

    /// Combine with logical AND.
    pub fn and(self, other: Predicate<T>) -> Self {
        Self::from_expr(FilterExpr::And(Box::new(self.expr), Box::new(other.expr)))
    }

    /// Combine with logical OR.
    pub fn or(self, other: Predicate<T>) -> Self {
        Self::from_expr(FilterExpr::Or(Box::new(self.expr), Box::new(other.expr)))
    }

    /// Logical negation.
    pub fn not(self) -> Self {
        Self::from_expr(FilterExpr::Not(Box::new(self.expr)))
    }

    /// The underlying expression tree.
    pub fn expr(&self) -> &FilterExpr {
        &self.expr
    }

    /// Render as SQL with placeholders numbered from `?1`.
    pub fn to_sql(&self) -> SqlFragment {
        self.to_sql_from(1)
    }

    /// Render as SQL with placeholders numbered from `?{first_index}`.
    pub fn to_sql_from(&self, first_index: usize) -> SqlFragment {
        let mut sql = String::new();
        let mut params = Vec::new();
        self.expr.render(&mut sql, &mut params, first_index);
        SqlFragment { sql, params }
    }
}

impl<T: Entity> Predicate<T> {
    /// `entity.<field> == value`. Fails when `field` is not declared by `T`.
    pub fn equals(field: &str, value: impl Into<FieldValue>) -> AppResult<Self> {
        let field = declared_field::<T>(field)?;
        Ok(Self::from_expr(FilterExpr::Eq {
            field,
            value: value.into(),
        }))
    }

    /// Rows that have not been soft-deleted: `deleted_at` null or zero.
    pub fn live() -> Self {
        let unset = FilterExpr::Eq {
            field: DELETED_AT,
            value: FieldValue::Null,
        };
        let zero = FilterExpr::Eq {
            field: DELETED_AT,
            value: FieldValue::Integer(0),
        };
        Self::from_expr(FilterExpr::Or(Box::new(unset), Box::new(zero)))
    }

    /// Evaluate against one entity instance.
    pub fn evaluate(&self, entity: &T) -> bool {
        self.expr.evaluate(&|name| entity.field(name))
    }
}

/// Build an equality predicate on a named property.
pub fn build_equals<T: Entity>(property: &str, value: impl Into<FieldValue>) -> AppResult<Predicate<T>> {
    Predicate::equals(property, value)
}

/// Combine two predicates with logical AND.
pub fn and<T>(left: Predicate<T>, right: Predicate<T>) -> Predicate<T> {
    left.and(right)
}

/// Combine two predicates with logical OR.
pub fn or<T>(left: Predicate<T>, right: Predicate<T>) -> Predicate<T> {
    left.or(right)
}

/// Build a sort projection on a named property.
pub fn build_sort_key<T: Entity>(property: &str) -> AppResult<SortKey<T>> {
    SortKey::new(property)
}

/// A projection of one entity field usable for ordering.
pub struct SortKey<T> {
    field: &'static str,
    _entity: PhantomData<fn(&T) -> FieldValue>,
}

impl<T> Clone for SortKey<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field,
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for SortKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SortKey").field(&self.field).finish()
    }
}

impl<T: Entity> SortKey<T> {
    /// Sort key over `field`. Fails when `field` is not declared by `T`.
    pub fn new(field: &str) -> AppResult<Self> {
        Ok(Self {
            field: declared_field::<T>(field)?,
            _entity: PhantomData,
        })
    }

    /// Column name.
    pub fn column(&self) -> &'static str {
        self.field
    }

    /// Project the key out of an entity.
    pub fn extract(&self, entity: &T) -> FieldValue {
        entity.field(self.field).unwrap_or(FieldValue::Null)
    }

    /// Compare two entities by this key.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.extract(a).sort_cmp(&self.extract(b))
    }
}

fn declared_field<T: Entity>(name: &str) -> AppResult<&'static str> {
    T::FIELDS
        .iter()
        .copied()
        .find(|f| *f == name)
        .ok_or_else(|| AppError::validation(format!("{} has no field '{name}'", T::NAME)))
}
