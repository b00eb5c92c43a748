//! The static fixture catalog.
//!
//! Each entry names a directory under the fixtures root holding an
//! `index.html` snapshot of a real site, plus what the detection engine is
//! expected to report for it. Notice expectations are stored as content
//! signatures rather than markup so the table stays small.

use std::path::{Path, PathBuf};

use serde::Serialize;
use url::Url;

use crate::error::{HarnessError, Result};

/// File loaded for every fixture directory.
pub const DOCUMENT_NAME: &str = "index.html";

/// Expected cookie notice: the base64 SHA-256 of its captured markup and its
/// hideable element range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpectedNotice {
    /// Content signature of the notice markup.
    pub hash: &'static str,
    /// Breadth of the hideable element subtree.
    pub range: u32,
}

impl ExpectedNotice {
    /// Creates a notice expectation.
    #[must_use]
    pub const fn new(hash: &'static str, range: u32) -> Self {
        Self { hash, range }
    }
}

/// A single fixture and its expectations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TestCase {
    /// Fixture directory name, also used as the host override.
    pub name: &'static str,
    /// `None` asserts that no notice is identified.
    pub expected_notice: Option<ExpectedNotice>,
    /// `None` leaves scroll blocking unverified.
    pub expected_scroll_blocked: Option<bool>,
}

impl TestCase {
    /// Creates a test case.
    #[must_use]
    pub const fn new(
        name: &'static str,
        expected_notice: Option<ExpectedNotice>,
        expected_scroll_blocked: Option<bool>,
    ) -> Self {
        Self {
            name,
            expected_notice,
            expected_scroll_blocked,
        }
    }

    /// Path of the fixture document: `<root>/<name>/index.html`.
    #[must_use]
    pub fn document_path(&self, root: &Path) -> PathBuf {
        root.join(self.name).join(DOCUMENT_NAME)
    }

    /// `file://` URL of the fixture document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFixtureRoot` if `root` is not absolute.
    pub fn document_url(&self, root: &Path) -> Result<Url> {
        Url::from_file_path(self.document_path(root))
            .map_err(|()| HarnessError::InvalidFixtureRoot(root.to_path_buf()))
    }
}

const fn case(
    name: &'static str,
    expected_notice: Option<ExpectedNotice>,
    expected_scroll_blocked: Option<bool>,
) -> TestCase {
    TestCase::new(name, expected_notice, expected_scroll_blocked)
}

const fn notice(hash: &'static str, range: u32) -> Option<ExpectedNotice> {
    Some(ExpectedNotice::new(hash, range))
}

/// Every fixture the harness knows about, in dispatch order.
#[rustfmt::skip]
pub static CATALOG: &[TestCase] = &[
    case("2021.rca.ac.uk", notice("fOBTu1EHcX9tzkrWM343dsu2kqDUM9w+cMbTc5tm2oc=", 1), Some(false)),
    case("abxxx.com", None, Some(false)),
    case("bongacams.com", None, Some(false)),
    case("brave.com", None, None),
    case("cam4.com", notice("O+Y60jG333dyHi6a3W1ZodZ7phKLk1Pr0SzhRHcKSps=", 1), Some(false)),
    case("cleveradvertising.com", None, Some(false)),
    case("copilot.microsoft.com", None, Some(false)),
    case("docs.base.org", notice("n7VghBvQo9fKfh5nqf8XLRdgA5KpZc2xjjIla8XHO+k=", 1), Some(false)),
    case("drpc.org", notice("59blMPXMrimFarphox8PzbXUl7EGzBkqQXlb2DjMJYU=", 1), Some(false)),
    case("euronews.com", notice("00Qf2C8vDmh5NYlIspQWh06S9rkUgq37TTrzAP+Odtg=", 3), Some(false)),
    case("fortune.com", notice("a1+3zJekpAmX/usMwCHTBbpo/osoiNAJpGCKuOBzoLE=", 1), Some(false)),
    case("freevideo.cz", None, Some(false)),
    case("github.com", None, Some(false)),
    case("goibibo.com", None, Some(false)),
    case("goodreads.com", None, Some(false)),
    case("gostateparks.hawaii.gov", notice("JBYwuwip4exVrQIqPUVGz+FWrjnVqwLj8vqq8TXAGs0=", 1), Some(false)),
    case("jamieoliver.com", None, Some(false)),
    case("jetsmart.com", None, Some(false)),
    case("liu.se", None, Some(false)),
    case("login.libero.it", notice("EFDuHT+cKspFIMwPpsLit5MBkADL4cFifJSluFLUu6k=", 1), Some(false)),
    case("mamba.ru", notice("3Cyijp+TBuq8kMOT+yFakpK3GUdgBw3dH5M9x5gLbok=", 2), Some(false)),
    case("massagerepublic.com", None, Some(false)),
    case("moovitapp.com", notice("yHJeNokduuywPXOjaF6MP9CJ4CBlF+X2H2u28UzLU6Y=", 2), Some(false)),
    case("myworldfix.com", None, Some(false)),
    case("nordarun.com", notice("3hfzlWrqxNkDKbXjcST9vWASCuPWUfA1e41DXZMZ82o=", 3), Some(false)),
    case("opensource.fb.com", notice("+5qjgLXR5vQPllW7bnKVkb97tTv4xG8TdAHJXmhiH2E=", 1), Some(false)),
    case("pleo.io", notice("DRv+MeADAubtGiWXFF9agr8Wk9IkZmCZEoUVvK3CqAs=", 1), Some(false)),
    case("primor.eu", notice("Gp7z9GqoTBMAwsgh9GKMrcNpQtXY+LCzL6miyu9TvdQ=", 3), Some(false)),
    case("privatekeys.pw", notice("UCeiNrGF2DKp4gRogdcWQlWSrKi93/o6SsJkFpAb20U=", 1), Some(false)),
    case("sendgrid.com", notice("WJ1cN7pc6ZMZkOUS+7qmrTn+AtlUMLKZONI8/eVhddc=", 1), Some(false)),
    case("stripchatgirls.com", notice("O87YRCJw7yJGJVXqcPcWzgCuEFcva+67/ZChFxR0ULk=", 1), Some(false)),
    case("supabase.com", notice("fyNq/gQyR53P46zGnFaQmzAcXthZrNTPgpjE5Qp+coE=", 2), Some(false)),
    case("tabelog.com", None, Some(false)),
    case("temporal.cloud", notice("bMYtB8cqUekB8ICfqzhjKDjkvqLxMMrfVEJsH55J+Pc=", 1), Some(false)),
    case("temporal.io", notice("yOY8MZfiQ7cLtdQNOHeOgGlYP6AfZrRRmeZyjCLDIp4=", 1), Some(false)),
    case("videosdemadurasx.com", None, Some(false)),
    case("vine.co", None, Some(false)),
    case("voximplant.com", notice("eibP8jYZYDWd1gOydbPONk71HShOp8TeCxdcrY37weI=", 1), Some(false)),
    case("withpersona.com", notice("BttgC24/jLdzla0v9kPROTNRLx/guLNXvIJQcGlX0+g=", 2), Some(false)),
    case("worldoftanks.eu", None, Some(false)),
    case("www.arnotts.com", notice("+/BFJe+enU6qj0ZxCjZRR54Nvc1UHk4dSJ5othAycE0=", 1), Some(false)),
    case("www.asdatyres.co.uk", notice("Qc9jfsaR6bbwRxt3Zgy7TmZpBjKPAOFCTf3D3ddzYoc=", 1), Some(false)),
    case("www.ashemaletube.com", None, Some(false)),
    case("www.epiphone.com", notice("xBn4GTL8C3TLWkLdf1iDPXXSWC0Y/QfnTmr6M5bK4sI=", 1), Some(false)),
    case("www.escort.club", None, Some(false)),
    case("www.finance-magazin.de", notice("jA+itzKHMdXEReaEUaNOKbEWnuzTajy8UqdzzfWI1Po=", 3), Some(false)),
    case("www.finn.no", notice("YLqo3cOckIQCrg0TY5cvEVYKVjguJDBcJTRdZsrrLDM=", 1), Some(true)),
    case("www.france24.com", notice("36uVkl4m+wUMPRZrHDdZDnrnK6/lz+ETsDoZArrbeNY=", 3), Some(false)),
    case("www.g-star.com", notice("tElFyJc98b8e1eIcMu7T4AyOR6b0mIaNvOAU6wwcPdU=", 2), Some(false)),
    case("www.gov.br", notice("2jP5ZkNOLK185bl96B/kXsg1SScsGjOzbSdy8VdLnZg=", 2), Some(false)),
    case("www.heise.de", notice("ILZYIEAu9Dh3pcdm7FS9EhQ3RKU8z7cfKVLp3h3NchI=", 1), Some(true)),
    case("www.intelligems.io", None, Some(false)),
    case("www.kafijasdraugs.lv", notice("PNqCk+fE2Az2o+hzvNXiqe+HHWh23mmAzrZNd9zeHzo=", 2), Some(false)),
    case("www.kellanova.com", notice("aZxeT/PGvgW5wcPMCkeXGJlXw88lC/GfEEJY+0bUXBU=", 2), Some(false)),
    case("www.lyrath.com", notice("k2lGP0argaS6Iu+9XWZxDgNim2kFpq6JQGy5o7b6BHc=", 1), Some(false)),
    case("www.meld.io", notice("SrMn/AlL+1vb9Ob9MneGIdHzuDVdK0QzOfBpLbBatCQ=", 1), Some(false)),
    case("www.meteomatics.com", notice("6Ps/8TBEuIaGYIyKkGiWhCO06jOtFFBwZkpvt2MES5w=", 1), Some(false)),
    case("www.mytime.mk", notice("tOFLQjiyjNl9dtaePfbDtKWouVwXBY7lxmakEVQK208=", 1), Some(true)),
    case("www.myway.com", None, Some(false)),
    case("www.nerdwallet.com", None, Some(false)),
    case("www.newsflare.com", notice("A1REDzJ4zCkWa3pUNGFFmChRUyObXuXONKwF/QA1s7A=", 1), Some(false)),
    case("www.northcoast.com", notice("agltnUgo6/v/bKDMe116cck0BQqmYn17Ma8G1R3ZVm0=", 1), Some(false)),
    case("www.outdooractive.com", notice("TFZ0mmoCPPMzbEMynO5ldHJqTTjto4jXA4SXpwFD5mU=", 1), Some(false)),
    case("www.pibank.com", notice("/R/SbX32j2pKrsl33C+CGURTgOWeC2kNe1PW9VMh098=", 1), Some(false)),
    case("www.plannedparenthood.org", notice("MTBXRXupEgImCJ6PURX2LZ3fqceWDu2mmZDqB8pCj5w=", 1), Some(false)),
    case("www.promod.fr", None, Some(true)),
    case("www.rebelmouse.com", None, Some(false)),
    case("www.refinery29.com", notice("+bdOjXMDngBgmjcnMxUSgSVBw9y0YCBZaGlrmJe9HF8=", 1), Some(true)),
    case("www.rfi.fr", notice("t8byePWKBspylgvPO568uEjwI4czAJ0ujhE3XfS2ur4=", 3), Some(false)),
    case("www.ryanair.com", notice("1aXesNIeRzje8VpkE6hjGYCeBYPk1nnVpNynB1YCQY8=", 1), Some(false)),
    case("www.unilad.com", notice("/PXxl4ws/HZVHq2wBHQVO9PtKFNSHHrl1wfCfmoaZ9w=", 1), Some(true)),
    case("www.wardvillage.com", notice("RiDcFOm/YVgP1DuCErIfD5/Va9KAXFoem+Pdcn2qZLA=", 1), Some(false)),
    case("www.whatnot.com", None, Some(false)),
    case("zora.co", notice("ZQGVsHwN2dm4XfAmUeYQeV2b0eJxM45CFdQtDyeVjU0=", 2), Some(false)),
];

/// Looks up a catalog entry by fixture name.
#[must_use]
pub fn find(name: &str) -> Option<&'static TestCase> {
    CATALOG.iter().find(|case| case.name == name)
}

/// Selects the named fixtures, keeping catalog order.
///
/// An empty selection means the whole catalog.
///
/// # Errors
///
/// Returns `UnknownFixture` for the first name the catalog does not contain.
pub fn select<S: AsRef<str>>(names: &[S]) -> Result<Vec<TestCase>> {
    if names.is_empty() {
        return Ok(CATALOG.to_vec());
    }

    if let Some(missing) = names.iter().map(AsRef::as_ref).find(|n| find(n).is_none()) {
        return Err(HarnessError::UnknownFixture(missing.to_string()));
    }

    Ok(CATALOG
        .iter()
        .filter(|case| names.iter().any(|n| n.as_ref() == case.name))
        .copied()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let mut seen = HashSet::new();
        for case in CATALOG {
            assert!(seen.insert(case.name), "duplicate fixture {}", case.name);
        }
        assert_eq!(seen.len(), 74);
    }

    #[test]
    fn expected_hashes_look_like_sha256_base64() {
        for case in CATALOG {
            if let Some(expected) = case.expected_notice {
                assert_eq!(expected.hash.len(), 44, "{}", case.name);
                assert!(expected.hash.ends_with('='), "{}", case.name);
                assert!(expected.range >= 1, "{}", case.name);
            }
        }
    }

    #[test]
    fn literal_scenarios_are_catalogued() {
        let brave = find("brave.com").unwrap();
        assert_eq!(brave.expected_notice, None);
        assert_eq!(brave.expected_scroll_blocked, None);

        let rca = find("2021.rca.ac.uk").unwrap();
        assert_eq!(
            rca.expected_notice,
            Some(ExpectedNotice::new(
                "fOBTu1EHcX9tzkrWM343dsu2kqDUM9w+cMbTc5tm2oc=",
                1
            ))
        );

        let refinery = find("www.refinery29.com").unwrap();
        assert!(refinery.expected_notice.is_some());
        assert_eq!(refinery.expected_scroll_blocked, Some(true));
    }

    #[test]
    fn select_keeps_catalog_order() {
        let picked = select(&["zora.co", "brave.com", "2021.rca.ac.uk"]).unwrap();
        let names: Vec<_> = picked.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["2021.rca.ac.uk", "brave.com", "zora.co"]);
    }

    #[test]
    fn select_rejects_unknown_names() {
        let err = select(&["brave.com", "example.invalid"]).unwrap_err();
        assert!(matches!(err, HarnessError::UnknownFixture(name) if name == "example.invalid"));
    }

    #[test]
    fn empty_selection_is_whole_catalog() {
        let all = select::<&str>(&[]).unwrap();
        assert_eq!(all.len(), CATALOG.len());
    }

    #[cfg(unix)]
    #[test]
    fn document_url_is_file_url() {
        let case = find("brave.com").unwrap();
        let url = case.document_url(Path::new("/srv/fixtures")).unwrap();
        assert_eq!(url.as_str(), "file:///srv/fixtures/brave.com/index.html");
    }

    #[test]
    fn document_url_rejects_relative_root() {
        let case = find("brave.com").unwrap();
        assert!(matches!(
            case.document_url(Path::new("fixtures")),
            Err(HarnessError::InvalidFixtureRoot(_))
        ));
    }
}
