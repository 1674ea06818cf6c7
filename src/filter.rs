use crate::models::{FilterCriteria, Listing};

/// Why a listing was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Price,
    Location,
    Availability,
}

/// Checks a listing against the criteria, reporting the first failed predicate
pub fn check(listing: &Listing, criteria: &FilterCriteria) -> Result<(), Rejection> {
    if listing.price < criteria.price_min || listing.price > criteria.price_max {
        return Err(Rejection::Price);
    }

    if !criteria
        .location_codes
        .iter()
        .any(|code| code.matches(&listing.address))
    {
        return Err(Rejection::Location);
    }

    // No date on the card means it is available now
    if let (Some(available), Some(limit)) = (listing.available_from, criteria.earliest_available_date) {
        if available > limit {
            return Err(Rejection::Availability);
        }
    }

    Ok(())
}

pub fn passes(listing: &Listing, criteria: &FilterCriteria) -> bool {
    check(listing, criteria).is_ok()
}
