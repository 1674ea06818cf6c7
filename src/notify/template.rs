use crate::models::Listing;
use chrono::{DateTime, TimeZone};
use maud::{html, Markup, DOCTYPE};
use std::fmt::Display;

/// Subject and HTML body for one new listing
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEmail {
    pub subject: String,
    pub html_body: String,
}

impl NotificationEmail {
    pub fn for_listing<Tz>(listing: &Listing, sent_at: DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let sent_at = sent_at.format("%Y-%m-%d %H:%M:%S").to_string();

        Self {
            subject: format!("🏠 New Room: {} - {}", format_euro(listing.price), listing.address),
            html_body: body(listing, &sent_at).into_string(),
        }
    }
}

/// `1400` -> `€1,400`
pub fn format_euro(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("€{}", grouped)
}

fn body(listing: &Listing, sent_at: &str) -> Markup {
    let availability = match listing.available_from {
        Some(date) => date.format("%-d %B %Y").to_string(),
        None => "Available now".to_string(),
    };

    html! {
        (DOCTYPE)
        html {
            body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;" {
                h2 style="color: #2c3e50;" { "New Room Available in Dublin!" }

                div style="background-color: #f8f9fa; padding: 20px; border-radius: 5px; margin: 20px 0;" {
                    p style="margin: 10px 0;" {
                        strong { "Price:" } " "
                        span style="color: #27ae60; font-size: 18px;" { (format_euro(listing.price)) "/month" }
                    }
                    p style="margin: 10px 0;" { strong { "Address:" } " " (listing.address) }
                    p style="margin: 10px 0;" { strong { "Available:" } " " (availability) }
                    @if let Some(kind) = &listing.property_type {
                        p style="margin: 10px 0;" { strong { "Property Type:" } " " (kind) }
                    }
                    @if listing.bedrooms > 0 {
                        p style="margin: 10px 0;" { strong { "Bedrooms:" } " " (listing.bedrooms.to_string()) }
                    }
                }

                div style="margin: 30px 0;" {
                    a href=(listing.url)
                        style="background-color: #3498db; color: white; padding: 12px 30px; text-decoration: none; border-radius: 5px; display: inline-block; font-weight: bold;" {
                        "View Full Listing on Daft.ie"
                    }
                }

                hr style="border: none; border-top: 1px solid #ddd; margin: 30px 0;";

                p style="font-size: 12px; color: #7f8c8d;" {
                    "This is an automated notification from your Room Hunter bot."
                    br;
                    "Listing ID: " (listing.id)
                    br;
                    "Sent: " (sent_at)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn listing() -> Listing {
        Listing {
            id: "123".to_string(),
            price: 1400,
            address: "Dublin 7, Phibsborough".to_string(),
            bedrooms: 1,
            url: "https://www.daft.ie/share/dublin-7-phibsborough/123".to_string(),
            available_from: None,
            property_type: Some("Double room".to_string()),
        }
    }

    #[test]
    fn euro_amounts_are_grouped() {
        assert_eq!(format_euro(0), "€0");
        assert_eq!(format_euro(950), "€950");
        assert_eq!(format_euro(1400), "€1,400");
        assert_eq!(format_euro(1234567), "€1,234,567");
    }

    #[test]
    fn subject_names_price_and_address() {
        let email = NotificationEmail::for_listing(&listing(), Utc::now());
        assert!(email.subject.contains("€1,400"));
        assert!(email.subject.contains("Dublin 7, Phibsborough"));
    }

    #[test]
    fn body_lists_details_and_link() {
        let mut listing = listing();
        listing.available_from = NaiveDate::from_ymd_opt(2025, 2, 9);
        let email = NotificationEmail::for_listing(&listing, Utc::now());

        assert!(email.html_body.contains("€1,400/month"));
        assert!(email.html_body.contains("9 February 2025"));
        assert!(email.html_body.contains("Double room"));
        assert!(email.html_body.contains("Bedrooms:"));
        assert!(email
            .html_body
            .contains(r#"href="https://www.daft.ie/share/dublin-7-phibsborough/123""#));
        assert!(email.html_body.contains("Listing ID: 123"));
    }

    #[test]
    fn unknown_fields_are_left_out() {
        let mut listing = listing();
        listing.bedrooms = 0;
        listing.property_type = None;
        let email = NotificationEmail::for_listing(&listing, Utc::now());

        assert!(email.html_body.contains("Available now"));
        assert!(!email.html_body.contains("Bedrooms:"));
        assert!(!email.html_body.contains("Property Type:"));
    }

    #[test]
    fn scraped_text_is_escaped() {
        let mut listing = listing();
        listing.address = "<script>alert(1)</script> Dublin 7".to_string();
        let email = NotificationEmail::for_listing(&listing, Utc::now());

        assert!(!email.html_body.contains("<script>"));
        assert!(email.html_body.contains("&lt;script&gt;"));
    }
}
