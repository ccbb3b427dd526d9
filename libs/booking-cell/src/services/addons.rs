use std::collections::HashSet;

use shared_models::{AddOn, NewBookingAddOn};

use crate::models::{AddOnSelection, BookingError};

/// Checks the client's selections against the service's active catalog and
/// freezes each line at the catalog price.
pub fn resolve_add_ons(
    selections: &[AddOnSelection],
    catalog: &[AddOn],
) -> Result<Vec<NewBookingAddOn>, BookingError> {
    let mut seen = HashSet::new();

    selections
        .iter()
        .map(|selection| {
            if !seen.insert(selection.add_on_id) {
                return Err(BookingError::InvalidAddOn(format!(
                    "{} selected more than once",
                    selection.add_on_id
                )));
            }

            if selection.quantity < 1 {
                return Err(BookingError::InvalidAddOn(format!(
                    "quantity for {} must be at least 1",
                    selection.add_on_id
                )));
            }

            let add_on = catalog
                .iter()
                .find(|a| a.id == selection.add_on_id && a.is_active)
                .ok_or_else(|| {
                    BookingError::InvalidAddOn(format!(
                        "{} is not offered with this service",
                        selection.add_on_id
                    ))
                })?;

            if let Some(quoted) = selection.price_eur_cents {
                if quoted != add_on.price_eur_cents {
                    return Err(BookingError::InvalidAddOn(format!(
                        "price for {} changed from {} to {}",
                        add_on.name, quoted, add_on.price_eur_cents
                    )));
                }
            }

            Ok(NewBookingAddOn {
                add_on_id: add_on.id,
                quantity: selection.quantity,
                unit_price_eur_cents: add_on.price_eur_cents,
            })
        })
        .collect()
}

/// Service price plus every add-on line.
pub fn price_with_add_ons(service_price_eur_cents: i64, add_ons: &[NewBookingAddOn]) -> i64 {
    add_ons.iter().fold(service_price_eur_cents, |total, line| {
        total.saturating_add(line.unit_price_eur_cents.saturating_mul(i64::from(line.quantity)))
    })
}
