use criterion::{Criterion, black_box, criterion_group, criterion_main};

use gpsrgen::{Catalog, GrammarParser, GroundingEngine, Notation, RuleStore, Tree};

const GRAMMAR_SRC: &str = r#"
  $fetch -> [please] (bring | give | hand) me the {object 1} (and | or) the {object 2} from the {room}
  $guide -> (guide | lead | escort) {person 1} to {person 2} in the {room}
"#;

const KB_SRC: &str = r#"
  object: apple | sponge | cup | towel | bowl | spoon
  person: alice | bob | carol | dave | erin
  room: kitchen | bedroom | office | hallway
"#;

fn count_groundings(engine: &GroundingEngine<'_, Catalog>, tree: &Tree) -> usize {
  engine.search(tree).count()
}

fn criterion_benchmark(c: &mut Criterion) {
  let kb = KB_SRC.parse::<Catalog>().unwrap();
  let engine = GroundingEngine::new(&kb);
  let guide = Notation
    .parse_sequence("guide {person 1} to {person 2} in the {room}")
    .unwrap();

  c.bench_function("load and expand rules", |b| {
    b.iter(|| {
      let mut store = RuleStore::new();
      store.load_rules(&Notation, black_box(GRAMMAR_SRC).lines()).unwrap()
    })
  });

  c.bench_function("enumerate constrained groundings", |b| {
    b.iter(|| count_groundings(black_box(&engine), black_box(&guide)))
  });

  c.bench_function("first grounding", |b| {
    b.iter(|| engine.ground(black_box(&guide)).unwrap())
  });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
