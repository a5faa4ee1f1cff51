use std::mem::swap;

/// Suggests known names close to a mistyped token. The two rows of the edit distance matrix are
/// kept between calls.
pub struct Spell(Vec<usize>, Vec<usize>);

impl Spell {
    pub const fn new() -> Self {
        Self(Vec::new(), Vec::new())
    }

    /// Returns the names of `dictionary` closer than `maximum` edits to `word`, nearest first.
    pub fn suggest<'a>(
        &mut self,
        word: &str,
        dictionary: impl IntoIterator<Item = &'a str>,
        maximum: usize,
    ) -> Vec<&'a str> {
        let word: Vec<char> = word.chars().map(|letter| letter.to_ascii_lowercase()).collect();
        let mut results = Vec::new();
        for candidate in dictionary {
            let letters: Vec<char> = candidate
                .chars()
                .map(|letter| letter.to_ascii_lowercase())
                .collect();
            let distance = self.distance(&word, &letters);
            if distance < maximum && !results.iter().any(|&(known, _)| known == candidate) {
                results.push((candidate, distance));
            }
        }
        results.sort_by_key(|&(_, distance)| distance);
        results.into_iter().map(|(candidate, _)| candidate).collect()
    }

    /// The edit threshold used for unmatched arguments.
    pub fn threshold(word: &str) -> usize {
        (word.chars().count() / 3).clamp(1, 3) + 1
    }

    fn distance(&mut self, left: &[char], right: &[char]) -> usize {
        if left.len() > right.len() {
            return self.distance(right, left);
        }

        let Self(previous, current) = self;
        previous.clear();
        previous.extend(0..=left.len());
        current.resize(left.len() + 1, 0);

        for i in 1..=right.len() {
            current[0] = i;
            for j in 1..=left.len() {
                let insert = current[j - 1] + 1;
                let delete = previous[j] + 1;
                let replace = previous[j - 1] + usize::from(left[j - 1] != right[i - 1]);
                current[j] = insert.min(delete).min(replace);
            }
            swap(previous, current);
        }

        previous[left.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(left: &str, right: &str) -> usize {
        let left: Vec<char> = left.chars().collect();
        let right: Vec<char> = right.chars().collect();
        Spell::new().distance(&left, &right)
    }

    #[test]
    fn distances() {
        assert_eq!(distance("--name", "--name"), 0);
        assert_eq!(distance("--name", "--nme"), 1);
        assert_eq!(distance("--name", "--naame"), 1);
        assert_eq!(distance("add", "rm"), 3);
        assert_eq!(distance("", "abc"), 3);
        assert_eq!(distance("ñandú", "nandu"), 2);
    }

    #[test]
    fn suggests_nearest_first() {
        let names = ["--verbose", "--version", "--out", "-v"];
        let suggestions = Spell::new().suggest("--verison", names, 4);
        assert_eq!(suggestions.first(), Some(&"--version"));
        assert!(!suggestions.contains(&"-v"));
    }

    #[test]
    fn thresholds_grow_with_length() {
        assert_eq!(Spell::threshold("-x"), 2);
        assert_eq!(Spell::threshold("--nme"), 2);
        assert_eq!(Spell::threshold("--verison"), 4);
        assert_eq!(Spell::threshold("--a-very-long-name"), 4);
    }
}
