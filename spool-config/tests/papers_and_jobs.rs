mod common;

use common::MockSpool;
use spool_config::{JobCommand, JobInfo, PaperInfo, PrinterAccess, Spooler};

fn spooler(printer: &str) -> Spooler<MockSpool> {
    Spooler::with_api(MockSpool::new(printer))
}

fn seed_papers(spooler: &Spooler<MockSpool>) {
    *spooler.api().paper_name_list.borrow_mut() = vec!["A4".to_string(), "Letter".to_string()];
    *spooler.api().paper_kind_list.borrow_mut() = vec![9, 1];
}

fn seed_queue(spooler: &Spooler<MockSpool>) {
    *spooler.api().queue.borrow_mut() = vec![
        JobInfo {
            id: 11,
            document: "report.pdf".into(),
            user: "amy".into(),
            status: 0,
            priority: 1,
            pages: 4,
        },
        JobInfo {
            id: 12,
            document: "invoice.pdf".into(),
            user: "bo".into(),
            status: 0,
            priority: 1,
            pages: 1,
        },
    ];
}

#[test]
fn test_papers_zip_names_and_kinds_positionally() {
    let spooler = spooler("Office Laser");
    seed_papers(&spooler);

    let papers = spooler.papers(None).unwrap();

    assert_eq!(
        papers,
        vec![
            PaperInfo {
                name: "A4".into(),
                kind: 9
            },
            PaperInfo {
                name: "Letter".into(),
                kind: 1
            },
        ]
    );
}

#[test]
fn test_papers_use_reduced_access_and_close() {
    let spooler = spooler("Office Laser");
    seed_papers(&spooler);

    spooler.papers(None).unwrap();

    assert_eq!(
        *spooler.api().opened_access.borrow(),
        vec![PrinterAccess::Use]
    );
    assert_eq!(spooler.api().opens.get(), 1);
    assert_eq!(spooler.api().closes.get(), 1);
}

#[test]
fn test_paper_kind_by_name() {
    let spooler = spooler("Office Laser");
    seed_papers(&spooler);

    assert_eq!(spooler.paper_kind(None, "A4").unwrap(), 9);
    assert_eq!(spooler.paper_kind(None, "Letter").unwrap(), 1);
}

#[test]
fn test_unknown_paper_is_zero_not_error() {
    let spooler = spooler("Office Laser");
    seed_papers(&spooler);

    assert_eq!(spooler.paper_kind(None, "NonexistentForm").unwrap(), 0);
}

#[test]
fn test_abort_jobs_cancels_every_job() {
    let spooler = spooler("Office Laser");
    seed_queue(&spooler);

    let count = spooler.abort_jobs(None).unwrap();

    assert_eq!(count, 2);
    assert_eq!(
        *spooler.api().commands.borrow(),
        vec![(11, JobCommand::Cancel), (12, JobCommand::Cancel)]
    );
    assert_eq!(spooler.api().closes.get(), 1);
}

#[test]
fn test_purge_jobs_deletes_every_job() {
    let spooler = spooler("Office Laser");
    seed_queue(&spooler);

    let count = spooler.purge_jobs(None).unwrap();

    assert_eq!(count, 2);
    assert_eq!(
        *spooler.api().commands.borrow(),
        vec![(11, JobCommand::Delete), (12, JobCommand::Delete)]
    );
}

#[test]
fn test_sweep_of_empty_queue_commands_nothing() {
    let spooler = spooler("Office Laser");

    let count = spooler.abort_jobs(None).unwrap();

    assert_eq!(count, 0);
    assert!(spooler.api().commands.borrow().is_empty());
    assert_eq!(spooler.api().closes.get(), 1);
}

#[test]
fn test_jobs_lists_the_queue() {
    let spooler = spooler("Office Laser");
    seed_queue(&spooler);

    let jobs = spooler.jobs(None).unwrap();

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].id, 11);
    assert_eq!(jobs[0].document, "report.pdf");
    assert_eq!(jobs[1].user, "bo");
}
