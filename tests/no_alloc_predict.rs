use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

use rust_perceptron::{DenseMultinomialAveragedPerceptron, SparseDenseMultinomialAveragedPerceptron};

struct CountingAlloc {
    allocs: AtomicUsize,
    reallocs: AtomicUsize,
}

impl CountingAlloc {
    const fn new() -> Self {
        Self {
            allocs: AtomicUsize::new(0),
            reallocs: AtomicUsize::new(0),
        }
    }

    fn reset(&self) {
        self.allocs.store(0, Ordering::Relaxed);
        self.reallocs.store(0, Ordering::Relaxed);
    }

    fn alloc_events(&self) -> usize {
        self.allocs.load(Ordering::Relaxed) + self.reallocs.load(Ordering::Relaxed)
    }
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.allocs.fetch_add(1, Ordering::Relaxed);
        unsafe { System.alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        self.allocs.fetch_add(1, Ordering::Relaxed);
        unsafe { System.alloc_zeroed(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        self.reallocs.fetch_add(1, Ordering::Relaxed);
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

#[global_allocator]
static ALLOC: CountingAlloc = CountingAlloc::new();

// Both checks live in one test so no other test thread allocates while counting.
#[test]
fn predict_allocations_do_not_grow_with_feature_count() {
    let nfeats = 512;
    let mut learner = DenseMultinomialAveragedPerceptron::new(nfeats, 8);
    for i in 0..nfeats {
        learner.train_one(&[i, (i * 7) % nfeats], &(i % 8));
    }
    let model = learner.freeze();

    let few: Vec<usize> = (0..2).collect();
    let many: Vec<usize> = (0..nfeats).collect();

    ALLOC.reset();
    let a = model.predict(&few);
    let alloc_few = ALLOC.alloc_events();

    ALLOC.reset();
    let b = model.predict(&many);
    let alloc_many = ALLOC.alloc_events();

    assert!(a.is_some() && b.is_some());
    assert_eq!(
        alloc_few, alloc_many,
        "dense scoring should allocate once per call, not per feature"
    );

    let mut sparse = SparseDenseMultinomialAveragedPerceptron::new(0, 4);
    let seen = vec!["bias".to_owned()];
    sparse.train_one(&seen, &3);
    let unseen: Vec<String> = (0..256).map(|i| format!("unseen={i}")).collect();
    let mut mixed = seen.clone();
    mixed.extend(unseen);

    ALLOC.reset();
    let p_seen = sparse.predict(&seen);
    let alloc_seen = ALLOC.alloc_events();

    ALLOC.reset();
    let p_mixed = sparse.predict(&mixed);
    let alloc_mixed = ALLOC.alloc_events();

    assert_eq!(p_seen, p_mixed);
    assert_eq!(
        alloc_seen, alloc_mixed,
        "absent sparse features must not allocate or materialize entries"
    );
    assert_eq!(sparse.outer_size(), 1);
}
