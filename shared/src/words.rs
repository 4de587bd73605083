//! Amounts in words using the Indian numbering system (crore, lakh, thousand)

const ONES: [&str; 10] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];

const TEENS: [&str; 10] = [
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;
const THOUSAND: u64 = 1_000;

/// Render `0..1000` in words; zero renders as an empty string
pub fn convert_less_than_one_thousand(n: u64) -> String {
    let n = n % 1000;
    let mut parts: Vec<&str> = Vec::with_capacity(4);

    let hundreds = (n / 100) as usize;
    if hundreds > 0 {
        parts.push(ONES[hundreds]);
        parts.push("Hundred");
    }

    let rest = (n % 100) as usize;
    if (10..20).contains(&rest) {
        parts.push(TEENS[rest - 10]);
    } else {
        let (tens, ones) = (rest / 10, rest % 10);
        if tens > 0 {
            parts.push(TENS[tens]);
        }
        if ones > 0 {
            parts.push(ONES[ones]);
        }
    }

    parts.join(" ")
}

/// Render an amount in words, e.g. `123456789` as
/// "Twelve Crore Thirty Four Lakh Fifty Six Thousand Seven Hundred Eighty Nine"
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }

    let crore = n / CRORE;
    let lakh = (n % CRORE) / LAKH;
    let thousand = (n % LAKH) / THOUSAND;
    let remainder = n % THOUSAND;

    let mut words: Vec<String> = Vec::new();
    if crore > 0 {
        // Counts of a thousand crore and more keep the same grouping
        words.push(format!("{} Crore", number_to_words(crore)));
    }
    if lakh > 0 {
        words.push(format!("{} Lakh", convert_less_than_one_thousand(lakh)));
    }
    if thousand > 0 {
        words.push(format!("{} Thousand", convert_less_than_one_thousand(thousand)));
    }
    if remainder > 0 {
        words.push(convert_less_than_one_thousand(remainder));
    }

    words.join(" ")
}
