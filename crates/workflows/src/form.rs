//! Selector fields of a workflow screen.

use cylinder_core::{CompanyId, Field, ProductId, TargetQuantity, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowForm {
    pub company: Option<CompanyId>,
    pub product: Option<ProductId>,
    pub quantity: Option<TargetQuantity>,
}

impl WorkflowForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self, field: Field) -> bool {
        match field {
            Field::Company => self.company.is_some(),
            Field::CylinderType => self.product.is_some(),
            Field::Quantity => self.quantity.is_some(),
        }
    }

    /// Check the required selectors in order.
    pub fn require(&self, fields: &[Field]) -> Result<(), ValidationError> {
        match fields.iter().copied().find(|f| !self.is_set(*f)) {
            Some(missing) => Err(ValidationError::MissingField(missing)),
            None => Ok(()),
        }
    }

    pub fn entered_quantity(&self) -> Result<TargetQuantity, ValidationError> {
        self.quantity.ok_or(ValidationError::QuantityRequired)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_missing_field_is_reported() {
        let form = WorkflowForm {
            quantity: Some(TargetQuantity::new(2).unwrap()),
            ..WorkflowForm::default()
        };
        assert_eq!(
            form.require(&[Field::Company, Field::CylinderType]),
            Err(ValidationError::MissingField(Field::Company))
        );
    }

    #[test]
    fn selectors_and_quantity_are_checked_separately() {
        let form = WorkflowForm {
            company: Some(CompanyId::numeric(1)),
            ..WorkflowForm::default()
        };
        assert_eq!(form.require(&[Field::Company]), Ok(()));
        assert_eq!(form.require(&[]), Ok(()));
        assert_eq!(form.entered_quantity(), Err(ValidationError::QuantityRequired));
    }

    #[test]
    fn complete_form_yields_the_target() {
        let mut form = WorkflowForm {
            company: Some(CompanyId::numeric(1)),
            product: Some(ProductId::numeric(3)),
            quantity: Some(TargetQuantity::new(4).unwrap()),
        };
        assert_eq!(form.require(&[Field::Company, Field::CylinderType]), Ok(()));
        assert_eq!(form.entered_quantity().map(|q| q.get()), Ok(4));
        form.reset();
        assert_eq!(form, WorkflowForm::default());
    }
}
