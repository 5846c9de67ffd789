use crate::{Error, Result};

/// Every `k`-element subset of `items` in lexicographic index order. Each subset keeps the
/// relative order of `items`.
pub fn combinations<T>(items: &[T], k: usize) -> Result<Vec<Vec<T>>>
where
	T: Clone,
{
	let n = items.len();

	if k > n {
		return Err(Error::CombinationSize { k, n });
	}

	let mut out = Vec::with_capacity(binomial(n, k).unwrap_or(0));
	let mut indices: Vec<usize> = (0..k).collect();

	loop {
		out.push(indices.iter().map(|&index| items[index].clone()).collect());

		let mut position = k;

		loop {
			if position == 0 {
				return Ok(out);
			}

			position -= 1;

			if indices[position] != position + n - k {
				break;
			}
		}

		indices[position] += 1;

		for next in position + 1..k {
			indices[next] = indices[next - 1] + 1;
		}
	}
}

pub fn binomial(n: usize, k: usize) -> Option<usize> {
	if k > n {
		return Some(0);
	}

	let k = k.min(n - k);
	let mut acc: usize = 1;

	for i in 0..k {
		acc = acc.checked_mul(n - i)? / (i + 1);
	}

	Some(acc)
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn counts_sizes_uniqueness_and_coverage() {
		for n in 0..=7_usize {
			let items: Vec<usize> = (0..n).collect();

			for k in 0..=n {
				let subsets = combinations(&items, k).expect("k <= n must succeed");

				assert_eq!(Some(subsets.len()), binomial(n, k), "n={n} k={k}");
				assert!(subsets.iter().all(|subset| subset.len() == k));

				let unique: HashSet<&Vec<usize>> = subsets.iter().collect();

				assert_eq!(unique.len(), subsets.len(), "duplicates for n={n} k={k}");

				if k > 0 {
					let covered: HashSet<usize> = subsets.iter().flatten().copied().collect();

					assert_eq!(covered.len(), n, "coverage for n={n} k={k}");
				}
			}
		}
	}

	#[test]
	fn subsets_preserve_relative_order() {
		let subsets = combinations(&["a", "b", "c"], 2).unwrap();

		assert_eq!(subsets, vec![vec!["a", "b"], vec!["a", "c"], vec!["b", "c"]]);
	}

	#[test]
	fn zero_size_yields_single_empty_subset() {
		let subsets = combinations(&["a", "b"], 0).unwrap();

		assert_eq!(subsets, vec![Vec::<&str>::new()]);
		assert_eq!(combinations::<u8>(&[], 0).unwrap().len(), 1);
	}

	#[test]
	fn oversized_request_fails() {
		let err = combinations(&[1, 2], 3).expect_err("k > n must fail");

		assert!(matches!(err, Error::CombinationSize { k: 3, n: 2 }));
	}
}
