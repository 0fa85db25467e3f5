/*!

This is the long-form manual for `vote_alignment` and `covote`.

## What gets computed

For one season, every pair of participants who voted for the same target in
the same round earns one shared vote. Only rounds before the season's phase
boundary (the merge) are counted, and rounds flagged as quits or medical
withdrawals are skipped. Pairs with at least `min_together` shared votes
(2 by default) form the "strong alliance" subset that downstream renderers
draw as graph edges.

## Input formats

### Season metadata

A single JSON object mapping season numbers to their metadata:

```text
{
  "1": {
    "name": "Borneo",
    "year": 2000,
    "merge_episode": 7,
    "finalists": ["Richard", "Kelly"],
    "winner": "Richard"
  }
}
```

Extra fields (`location`, `url`, `episodes`, `tribe_merge_name`, ...) are
tolerated and ignored. `winner` must be listed in `finalists`; the validator
reports a warning otherwise.

### Season data files

One file per season, named `season<N>.json` inside the data directory:

```text
{
  "contestants": ["Sonja", "B.B.", "Stacey", "..."],
  "voting_history": [
    {
      "episode": 1,
      "eliminated": "Sonja",
      "votes": {"B.B.": "Sonja", "Colleen": "Sonja", "Dirk": "Rudy"}
    },
    {
      "episode": 2,
      "eliminated": "Jenna",
      "medevac": true,
      "votes": {}
    }
  ]
}
```

Notes:
- only pre-merge rounds belong in the file; the validator flags anything at
  or past `merge_episode`
- quits use `"quit": true`, medical withdrawals `"medevac": true`; both carry
  an empty vote mapping
- the label `TBD` is accepted anywhere a name is not known yet
- revotes keep the same episode number (the validator reports duplicate
  rounds as warnings, not errors)

### CSV import

`covote --import-csv <file>` converts a CSV vote export with the columns
`season,episode,castaway,vote,voted_out` into per-season data files. Rows are
grouped by season and episode; missing cells become `TBD`.

## Output

Each analyzed season produces `season<NN>/analysis_results.json` with the
participant list, finalist and winner passthrough, the full alignment list
and the strong subset, each entry shaped as
`{"player1": ..., "player2": ..., "votes_together": ...}` and sorted by
count descending. Everything a grapher needs is in this one file; the raw
events are never required downstream.

*/
