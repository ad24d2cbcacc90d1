use aliri_braid::braid;
use std::fmt;

/// Hides a secret behind a label
///
/// The alternate debug form (`{:#?}`) shows a short prefix of the value;
/// a width (`{:#9?}`) sets how many characters the output may use.
macro_rules! redacted {
    ($ty:ty: $label:literal, $prefix:literal) => {
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                if !f.alternate() {
                    return f.write_str(concat!("***", $label, "***"));
                }

                let budget = f.width().unwrap_or($prefix);
                write!(f, "\"{}\"", Prefix(&self.0, budget))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(concat!("***", $label, "***"))
            }
        }
    };
}

/// At most `budget` characters of a secret, the last being an ellipsis if
/// anything was cut
struct Prefix<'a>(&'a str, usize);

impl fmt::Display for Prefix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Prefix(secret, budget) = *self;
        if budget < 2 {
            return f.write_str("…");
        }

        match secret.char_indices().nth(budget - 1) {
            Some((cut, _)) => write!(f, "{}…", &secret[..cut]),
            None => f.write_str(secret),
        }
    }
}

/// The raw value of the gateway's `Authorization` header
#[braid(serde, debug = "owned", display = "owned")]
pub struct AuthorizationToken;

redacted!(AuthorizationTokenRef: "AUTHORIZATION TOKEN", 16);

/// A password held in a reference credential
#[braid(serde, debug = "owned", display = "owned")]
pub struct Password;

redacted!(PasswordRef: "PASSWORD", 1);

/// A client secret held in a reference credential
#[braid(serde, debug = "owned", display = "owned")]
pub struct ClientSecret;

redacted!(ClientSecretRef: "CLIENT SECRET", 5);
