pub(crate) mod catalog;
pub(crate) mod checkout;
pub(crate) mod grading;
