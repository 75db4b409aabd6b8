//! User-facing verification messages and security advice.

const ADVICE_ADDRESS_MATCHES: &str =
    "Upewnij się, że adres w przeglądarce dokładnie odpowiada temu w komunikatach instytucji.";
const ADVICE_CHECK_TLS: &str =
    "Sprawdź certyfikat TLS – powinien być wystawiony na domenę gov.pl.";
const ADVICE_NO_CREDENTIALS: &str =
    "Nie podawaj danych logowania ani numerów dokumentów na tej stronie.";
const ADVICE_COMPARE_COMPENDIUM: &str = "Porównaj adres z listą domen w kompendium gov.pl.";
const ADVICE_VERIFY_IN_COMPENDIUM: &str =
    "Zweryfikuj adres w oficjalnym kompendium domen gov.pl.";
const ADVICE_WATCH_TYPOS: &str =
    "Szukaj literówek lub dodatkowych znaków w adresie, które mogą sugerować phishing.";

/// Outcome of the ancestor walk, as far as messaging is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict<'a> {
    /// Hostname is outside the government suffix
    Foreign,
    /// Hostname is itself listed
    Exact(&'a str),
    /// Hostname is a subdomain of a listed domain
    Ancestor(&'a str),
    /// Under the suffix but nothing listed
    Unlisted,
}

impl<'a> Verdict<'a> {
    pub(crate) fn new(normalized: &str, matched: Option<&'a str>, is_gov_domain: bool) -> Self {
        match matched {
            Some(domain) if domain == normalized => Verdict::Exact(domain),
            Some(domain) => Verdict::Ancestor(domain),
            None if is_gov_domain => Verdict::Unlisted,
            None => Verdict::Foreign,
        }
    }

    pub(crate) fn confidence(&self) -> f64 {
        match self {
            Verdict::Exact(_) => 1.0,
            Verdict::Ancestor(_) => 0.85,
            Verdict::Unlisted | Verdict::Foreign => 0.0,
        }
    }

    pub(crate) fn message(&self, normalized: &str, suffix: &str, apex: &str) -> String {
        match self {
            Verdict::Foreign => format!(
                "Domena {} nie kończy się na {} – prawdopodobnie nie należy do administracji publicznej.",
                normalized, suffix
            ),
            Verdict::Exact(matched) => {
                format!("Domena {} figuruje w oficjalnym rejestrze {}.", matched, apex)
            }
            Verdict::Ancestor(matched) => format!(
                "Domena {} korzysta z oficjalnie zarejestrowanej bazy {} w strefie {}.",
                normalized, matched, apex
            ),
            Verdict::Unlisted => {
                format!("Nie znaleziono domeny {} w kompendium {}.", normalized, apex)
            }
        }
    }

    pub(crate) fn advice(&self) -> Vec<String> {
        let lines: &[&str] = match self {
            Verdict::Exact(_) | Verdict::Ancestor(_) => &[ADVICE_ADDRESS_MATCHES, ADVICE_CHECK_TLS],
            Verdict::Unlisted => &[
                ADVICE_NO_CREDENTIALS,
                ADVICE_COMPARE_COMPENDIUM,
                ADVICE_WATCH_TYPOS,
            ],
            Verdict::Foreign => &[ADVICE_NO_CREDENTIALS, ADVICE_VERIFY_IN_COMPENDIUM],
        };
        lines.iter().map(|line| line.to_string()).collect()
    }
}
