//! Allele normalization helpers.
//!
//! The export writes indels with padded alleles (`AT/AAT`); the registry
//! expects the minimal representation with shifted coordinates and `-` for
//! an empty allele. HGVS expressions with a parenthesized sequence length
//! are likewise repaired by substituting the actual allele sequence.

use cvsub_model::error::ModelError;
use cvsub_model::ids::EMPTY_ALLELE;

/// A locus reduced to its minimal allele representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimalAlleles {
    pub reference: String,
    pub alternate: String,
    pub start: u64,
    pub stop: u64,
    /// True when the alleles were rewritten; any HGVS derived from the
    /// padded form is stale and must be cleared.
    pub changed: bool,
}

/// Trim the common suffix, then the common prefix, of `reference`/`alternate`
/// and shift `start`/`stop` accordingly. An allele trimmed to nothing becomes
/// `-`. Alleles already minimal (single-base SNV, or one side already `-`)
/// pass through untouched. A `stop` too small to absorb the trimmed suffix
/// means the coordinates never described these alleles.
pub fn minimal_representation(
    reference: &str,
    alternate: &str,
    start: u64,
    stop: u64,
) -> Result<MinimalAlleles, ModelError> {
    let unchanged = |reference: &str, alternate: &str| MinimalAlleles {
        reference: reference.to_string(),
        alternate: alternate.to_string(),
        start,
        stop,
        changed: false,
    };
    if reference == EMPTY_ALLELE
        || alternate == EMPTY_ALLELE
        || (reference.len() == 1 && alternate.len() == 1)
        || reference == alternate
    {
        return Ok(unchanged(reference, alternate));
    }

    let mut re: Vec<char> = reference.chars().collect();
    let mut alt: Vec<char> = alternate.chars().collect();
    let mut new_start = start;
    let mut new_stop = stop;

    while !re.is_empty() && !alt.is_empty() && re.last() == alt.last() {
        re.pop();
        alt.pop();
        new_stop = new_stop.checked_sub(1).ok_or_else(|| {
            ModelError::MalformedRow(format!(
                "stop {stop} is smaller than the shared suffix of {reference}/{alternate}"
            ))
        })?;
    }
    let mut prefix = 0usize;
    while prefix < re.len() && prefix < alt.len() && re[prefix] == alt[prefix] {
        prefix += 1;
    }
    re.drain(..prefix);
    alt.drain(..prefix);
    new_start += prefix as u64;

    let render = |chars: &[char]| {
        if chars.is_empty() {
            EMPTY_ALLELE.to_string()
        } else {
            chars.iter().collect()
        }
    };
    let new_reference = render(&re);
    let new_alternate = render(&alt);
    let changed = new_reference != reference || new_alternate != alternate;
    if !changed {
        return Ok(unchanged(reference, alternate));
    }
    Ok(MinimalAlleles {
        reference: new_reference,
        alternate: new_alternate,
        start: new_start,
        stop: new_stop,
        changed,
    })
}

/// Reverse complement of a genomic sequence. Unknown bases pass through.
pub fn reverse_complement(sequence: &str) -> String {
    sequence
        .chars()
        .rev()
        .map(|base| match base {
            'A' => 'T',
            'T' => 'A',
            'C' => 'G',
            'G' => 'C',
            other => other,
        })
        .collect()
}

/// Repair an uncertain HGVS expression.
///
/// The export sometimes writes the inserted sequence as a parenthesized
/// length, e.g. `NM_x:c.10_11ins(4)`, which the registry rejects. The
/// parenthesized part of the first listed expression is replaced with the
/// reverse complement of the alternate allele (the first transcript is on
/// the opposite strand), and of the second with the allele itself.
pub fn repair_hgvs(hgvs: &str, alternate: &str) -> Option<String> {
    if !hgvs.contains('(') {
        return None;
    }
    let repaired: Vec<String> = hgvs
        .split(',')
        .enumerate()
        .map(|(idx, expression)| {
            let substitute = if idx == 0 {
                reverse_complement(alternate)
            } else {
                alternate.to_string()
            };
            replace_parenthesized(expression, &substitute)
        })
        .collect();
    Some(repaired.join(","))
}

fn replace_parenthesized(expression: &str, substitute: &str) -> String {
    let mut out = String::with_capacity(expression.len());
    let mut rest = expression;
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')') else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(substitute);
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_collapses_to_empty_reference() {
        let minimal = minimal_representation("AT", "AAT", 100, 102).unwrap();
        assert_eq!(minimal.reference, "-");
        assert_eq!(minimal.alternate, "A");
        assert_eq!((minimal.start, minimal.stop), (100, 100));
        assert!(minimal.changed);
    }

    #[test]
    fn deletion_collapses_to_empty_alternate() {
        let minimal = minimal_representation("AAT", "AT", 100, 102).unwrap();
        assert_eq!(minimal.reference, "A");
        assert_eq!(minimal.alternate, "-");
        assert_eq!((minimal.start, minimal.stop), (100, 100));
    }

    #[test]
    fn embedded_snv_is_reduced() {
        let minimal = minimal_representation("ACG", "ATG", 100, 102).unwrap();
        assert_eq!(minimal.reference, "C");
        assert_eq!(minimal.alternate, "T");
        assert_eq!((minimal.start, minimal.stop), (101, 101));
    }

    #[test]
    fn single_base_snv_untouched() {
        let minimal = minimal_representation("A", "T", 100, 101).unwrap();
        assert!(!minimal.changed);
        assert_eq!(minimal.reference, "A");
    }

    #[test]
    fn stop_smaller_than_shared_suffix_is_malformed() {
        let error = minimal_representation("CAT", "GAT", 0, 1).unwrap_err();
        assert!(matches!(error, ModelError::MalformedRow(_)));
    }

    #[test]
    fn reverse_complement_flips_and_reverses() {
        assert_eq!(reverse_complement("GATC"), "GATC");
        assert_eq!(reverse_complement("AACG"), "CGTT");
    }

    #[test]
    fn repair_substitutes_both_strands() {
        let repaired = repair_hgvs("NM_1:c.1_2ins(4),NM_2:c.5_6ins(4)", "ACGT").unwrap();
        assert_eq!(repaired, "NM_1:c.1_2insACGT,NM_2:c.5_6insACGT");
        let repaired = repair_hgvs("NM_1:c.1_2ins(2)", "AC").unwrap();
        assert_eq!(repaired, "NM_1:c.1_2insGT");
    }

    #[test]
    fn repair_passes_plain_hgvs_through() {
        assert!(repair_hgvs("NM_1:c.1A>G", "G").is_none());
    }
}
