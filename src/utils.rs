/// Takes a list where each element is a set of choices, and returns every way
/// of picking one element from each set, with the first set varying slowest.
/// Will clone the elements. An empty list has exactly one (empty) combination.
///
/// ```
/// let v = vec![
///   vec![1],
///   vec![2, 3],
///   vec![4, 5],
/// ];
///
/// assert_eq!(gpsrgen::utils::combinations(&v), vec![
///   vec![1, 2, 4],
///   vec![1, 2, 5],
///   vec![1, 3, 4],
///   vec![1, 3, 5],
/// ]);
/// ```
pub fn combinations<T>(list: &[Vec<T>]) -> Vec<Vec<T>>
where
  T: Clone,
{
  list.iter().fold(vec![Vec::new()], |prefixes, choices| {
    prefixes
      .iter()
      .flat_map(|prefix| {
        // extend every prefix so far with each choice from this set
        choices.iter().map(move |c| {
          let mut seq = prefix.clone();
          seq.push(c.clone());
          seq
        })
      })
      .collect()
  })
}

#[test]
fn test_combinations_with_empty_set() {
  let v: Vec<Vec<u8>> = vec![vec![1, 2], vec![]];
  assert!(combinations(&v).is_empty());

  let none: Vec<Vec<u8>> = Vec::new();
  assert_eq!(combinations(&none), vec![Vec::<u8>::new()]);
}
