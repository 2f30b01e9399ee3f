use crate::config::RouteTable;
use crate::domain::basket::ValidationError;
use crate::domain::checkout::{CheckoutStep, TargetRoute};

// ============================================================================
// Route Resolver
// ============================================================================
//
// Pure mapping from checkout steps (or validation issues) to paths.
//
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RouteResolver {
    routes: RouteTable,
}

impl RouteResolver {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }

    /// Page for a step. Receipt has none: it only exists once the order does.
    pub fn resolve_step(&self, step: CheckoutStep) -> Option<&str> {
        match step {
            CheckoutStep::Addresses => Some(&self.routes.addresses),
            CheckoutStep::Shipping => Some(&self.routes.shipping),
            CheckoutStep::Payment => Some(&self.routes.payment),
            CheckoutStep::Review => Some(&self.routes.review),
            CheckoutStep::Receipt => None,
        }
    }

    /// Route an outcome for `step` should carry; steps without a page defer
    /// to their issues
    pub fn step_target(&self, step: CheckoutStep) -> TargetRoute {
        self.resolve_step(step).map_or(TargetRoute::Auto, TargetRoute::path)
    }

    /// Page where the first issue can be fixed.
    ///
    /// Only the first error counts. Its scopes are matched against the steps
    /// in checkout order; issues no step owns go to the basket overview.
    pub fn resolve_issues(&self, errors: &[ValidationError]) -> &str {
        let Some(first) = errors.first() else {
            return &self.routes.basket;
        };

        CheckoutStep::ALL
            .into_iter()
            .filter(|step| first.scopes().iter().any(|scope| step.owns_issue_scope(scope)))
            .find_map(|step| self.resolve_step(step))
            .unwrap_or(&self.routes.basket)
    }

    pub fn resolve_target<'a>(&'a self, target: &'a TargetRoute, errors: &[ValidationError]) -> &'a str {
        match target {
            TargetRoute::Path(path) => path,
            TargetRoute::Auto => self.resolve_issues(errors),
        }
    }

    pub fn basket(&self) -> &str {
        &self.routes.basket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::basket::ValidationScope;

    fn issue(scopes: &[ValidationScope]) -> ValidationError {
        ValidationError::new("1234", "error", scopes.iter().cloned())
    }

    #[test]
    fn test_every_step_has_a_route() {
        let resolver = RouteResolver::default();
        assert_eq!(resolver.resolve_step(CheckoutStep::Addresses), Some("/checkout/address"));
        assert_eq!(resolver.resolve_step(CheckoutStep::Shipping), Some("/checkout/shipping"));
        assert_eq!(resolver.resolve_step(CheckoutStep::Payment), Some("/checkout/payment"));
        assert_eq!(resolver.resolve_step(CheckoutStep::Review), Some("/checkout/review"));
    }

    #[test]
    fn test_receipt_is_not_a_navigation_target() {
        let resolver = RouteResolver::default();
        assert_eq!(resolver.resolve_step(CheckoutStep::Receipt), None);
        assert_eq!(resolver.step_target(CheckoutStep::Receipt), TargetRoute::Auto);
        assert_eq!(resolver.step_target(CheckoutStep::Review), TargetRoute::path("/checkout/review"));
    }

    #[test]
    fn test_address_issue_resolves_to_address_page() {
        let resolver = RouteResolver::default();
        let errors = vec![issue(&[ValidationScope::Addresses])];
        assert_eq!(resolver.resolve_issues(&errors), "/checkout/address");
    }

    #[test]
    fn test_first_error_wins() {
        let resolver = RouteResolver::default();
        let errors = vec![
            issue(&[ValidationScope::Payment]),
            issue(&[ValidationScope::ShippingAddress]),
        ];
        assert_eq!(resolver.resolve_issues(&errors), "/checkout/payment");
    }

    #[test]
    fn test_earliest_step_of_first_error_wins() {
        let resolver = RouteResolver::default();
        let errors = vec![issue(&[ValidationScope::Payment, ValidationScope::InvoiceAddress])];
        assert_eq!(resolver.resolve_issues(&errors), "/checkout/address");
    }

    #[test]
    fn test_unowned_scopes_fall_back_to_basket() {
        let resolver = RouteResolver::default();
        for scope in [
            ValidationScope::Products,
            ValidationScope::Promotion,
            ValidationScope::All,
            ValidationScope::Other("Unknown".to_string()),
        ] {
            assert_eq!(resolver.resolve_issues(&[issue(&[scope])]), "/basket");
        }
        assert_eq!(resolver.resolve_issues(&[]), "/basket");
    }

    #[test]
    fn test_resolve_target_passes_paths_through() {
        let resolver = RouteResolver::default();
        let target = TargetRoute::path("/checkout/review");
        let errors = vec![issue(&[ValidationScope::Shipping])];

        assert_eq!(resolver.resolve_target(&target, &errors), "/checkout/review");
        assert_eq!(resolver.resolve_target(&TargetRoute::Auto, &errors), "/checkout/shipping");
    }

    #[test]
    fn test_custom_route_table() {
        let resolver = RouteResolver::new(RouteTable {
            basket: "/cart".to_string(),
            ..RouteTable::default()
        });
        assert_eq!(resolver.resolve_issues(&[issue(&[ValidationScope::Value])]), "/cart");
    }
}
