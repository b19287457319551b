use postag::{corpus, Evaluation, Model, StartPolicy, Tagger, Trainer};

const TRAIN: &str = "\
The DT
dog NN
barks VBZ
. .

A DT
cat NN
sleeps VBZ
. .

Dogs NNS
bark VBP
. .

The DT
cat NN
likes VBZ
the DT
dog NN
. .
";

const TEST: &str = "\
The
cat
barks
.

Dogs
sleep
.
";

fn train(policy: StartPolicy) -> Model {
    let mut trainer = Trainer::new().start_policy(policy);
    for s in corpus::read_tagged_corpus(TRAIN.as_bytes()).unwrap() {
        trainer.push_sentence(s);
    }
    trainer.train().unwrap()
}

#[test]
fn test_train_write_read_tag() {
    let model = train(StartPolicy::Learned);
    let mut buf = vec![];
    model.write(&mut buf).unwrap();
    let model = Model::read(&mut buf.as_slice()).unwrap();

    let tagger = Tagger::new(&model).unwrap();
    let mut output = vec![];
    for words in corpus::read_untagged_corpus(TEST.as_bytes()).unwrap() {
        let tags = tagger.tag(&words).unwrap();
        corpus::write_tagged_sentence(&mut output, &words, &tags).unwrap();
    }

    assert_eq!(
        "The\tDT\ncat\tNN\nbarks\tVBZ\n.\t.\n\nDogs\tNNS\nsleep\tVBP\n.\t.\n\n",
        String::from_utf8(output).unwrap()
    );
}

#[test]
fn test_tagged_output_is_a_corpus() {
    let model = train(StartPolicy::Floor);
    let tagger = Tagger::new(&model).unwrap();
    let gold = corpus::read_tagged_corpus(TRAIN.as_bytes()).unwrap();

    let mut output = vec![];
    let mut eval = Evaluation::new();
    for s in &gold {
        let tags = tagger.tag(s.words()).unwrap();
        eval.accumulate(s.tags(), &tags).unwrap();
        corpus::write_tagged_sentence(&mut output, s.words(), &tags).unwrap();
    }
    let retagged = corpus::read_tagged_corpus(output.as_slice()).unwrap();

    assert_eq!(gold.len(), retagged.len());
    assert_eq!(1.0, eval.item_accuracy());
    assert_eq!(gold, retagged);
}

#[test]
fn test_merged_corpus_trains_like_both() {
    let (first, second) = TRAIN.split_at(TRAIN.find("Dogs").unwrap());
    let mut merged = vec![];
    corpus::merge_corpora([first.as_bytes(), second.as_bytes()], &mut merged).unwrap();

    assert_eq!(TRAIN.as_bytes(), merged.as_slice());

    let mut trainer = Trainer::new();
    for s in corpus::read_tagged_corpus(first.as_bytes())
        .unwrap()
        .into_iter()
        .chain(corpus::read_tagged_corpus(second.as_bytes()).unwrap())
    {
        trainer.push_sentence(s);
    }
    assert_eq!(train(StartPolicy::Learned), trainer.train().unwrap());
}
